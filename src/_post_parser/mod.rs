use crate::_impl_trinary_network::InteractionTemp;
use crate::{TrinaryNetwork, ID_REGEX};

/// **(internal)** Strip a `#` comment and surrounding whitespace.
fn clean_line(line: &str) -> &str {
    match line.find('#') {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

/// **(internal)** Parse one header row of `count` integers.
fn parse_int_row(line: &str, count: usize, what: &str) -> Result<Vec<i32>, String> {
    let values: Vec<&str> = line.split_whitespace().collect();
    if values.len() != count {
        return Err(format!(
            "Header declares {} variables but {} {} values.",
            count,
            values.len(),
            what
        ));
    }
    values
        .iter()
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| format!("`{}` is not a valid {} value.", token, what))
        })
        .collect()
}

impl TrinaryNetwork {
    /// Try to load a network from the primary "post" model description.
    ///
    /// The format is line oriented, with `#` comments and blank lines
    /// ignored: a header line of variable names, a line of domain sizes, a
    /// line of domain minimums, and then one
    /// `name = [dependency PROMOTES|INHIBITS]*` line per variable, in header
    /// order.
    pub fn try_from_post_string(model_string: &str) -> Result<TrinaryNetwork, String> {
        let lines: Vec<&str> = model_string
            .lines()
            .map(clean_line)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() < 3 {
            return Err(
                "Model description needs a name line, a size line, and a minimum line.".to_string(),
            );
        }

        let names: Vec<&str> = lines[0].split_whitespace().collect();
        for name in &names {
            if !ID_REGEX.is_match(name) {
                return Err(format!("Invalid variable name `{}`.", name));
            }
        }
        let sizes = parse_int_row(lines[1], names.len(), "domain size")?;
        let minimums = parse_int_row(lines[2], names.len(), "domain minimum")?;
        for (name, size) in names.iter().zip(sizes.iter()) {
            if *size < 1 {
                return Err(format!("Variable `{}` has an empty domain.", name));
            }
        }

        let rows = &lines[3..];
        if rows.len() != names.len() {
            return Err(format!(
                "Expected {} interaction lines, found {}.",
                names.len(),
                rows.len()
            ));
        }

        let mut temps = Vec::with_capacity(names.len());
        for (i, row) in rows.iter().enumerate() {
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() < 2 || tokens[1] != "=" {
                return Err(format!("Interaction line `{}` is missing `=`.", row));
            }
            if tokens[0] != names[i] {
                return Err(format!(
                    "Interaction line for `{}` is out of order (expected `{}`).",
                    tokens[0], names[i]
                ));
            }
            if (tokens.len() - 2) % 2 != 0 {
                return Err(format!(
                    "Interaction line for `{}` has a dependency without a relation keyword.",
                    tokens[0]
                ));
            }
            let mut activators = Vec::new();
            let mut inhibitors = Vec::new();
            for pair in tokens[2..].chunks(2) {
                let (dependency, relation) = (pair[0], pair[1]);
                if !names.contains(&dependency) {
                    return Err(format!(
                        "Variable `{}` depends on `{}`, which has no interaction line of its own.",
                        tokens[0], dependency
                    ));
                }
                match relation {
                    "PROMOTES" => activators.push(dependency.to_string()),
                    "INHIBITS" => inhibitors.push(dependency.to_string()),
                    _ => {
                        return Err(format!(
                            "Unknown relation keyword `{}` (expected PROMOTES or INHIBITS).",
                            relation
                        ))
                    }
                }
            }
            temps.push(InteractionTemp {
                name: tokens[0].to_string(),
                activators,
                inhibitors,
                lower_bound: minimums[i],
                upper_bound: minimums[i] + sizes[i] - 1,
            });
        }

        TrinaryNetwork::from_temps(temps)
    }
}
