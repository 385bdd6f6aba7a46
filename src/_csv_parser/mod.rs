use crate::_impl_trinary_network::InteractionTemp;
use crate::TrinaryNetwork;

impl TrinaryNetwork {
    /// Try to load a network from the legacy CSV interaction matrix.
    ///
    /// The matrix is square, with entries in `{-1, 0, 1}`: row `r`, column
    /// `c` holds the sign with which variable `c` regulates variable `r`.
    /// Variables are named `v0..v{K-1}` in row order. A row of all zeros
    /// describes a variable with no regulators; such variables get the
    /// degenerate domain `{0}`, all others the trinary `{-1, 0, 1}`.
    pub fn try_from_csv_string(model_string: &str) -> Result<TrinaryNetwork, String> {
        let mut matrix: Vec<Vec<i32>> = Vec::new();
        for line in model_string.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row: Result<Vec<i32>, String> = line
                .split(',')
                .map(|token| {
                    let token = token.trim();
                    match token {
                        "-1" => Ok(-1),
                        "0" => Ok(0),
                        "1" => Ok(1),
                        _ => Err(format!("`{}` is not a valid matrix entry.", token)),
                    }
                })
                .collect();
            matrix.push(row?);
        }
        if matrix.is_empty() {
            return Err("Matrix declares no variables.".to_string());
        }
        for (r, row) in matrix.iter().enumerate() {
            if row.len() != matrix.len() {
                return Err(format!(
                    "Matrix is not square: row {} has {} of {} entries.",
                    r,
                    row.len(),
                    matrix.len()
                ));
            }
        }

        let temps = matrix
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let activators: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(_, sign)| **sign == 1)
                    .map(|(c, _)| format!("v{}", c))
                    .collect();
                let inhibitors: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(_, sign)| **sign == -1)
                    .map(|(c, _)| format!("v{}", c))
                    .collect();
                let (lower_bound, upper_bound) = if activators.is_empty() && inhibitors.is_empty() {
                    (0, 0)
                } else {
                    (-1, 1)
                };
                InteractionTemp {
                    name: format!("v{}", r),
                    activators,
                    inhibitors,
                    lower_bound,
                    upper_bound,
                }
            })
            .collect();

        TrinaryNetwork::from_temps(temps)
    }
}
