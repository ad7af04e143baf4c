//! Cell notation.
//!
//! Cells are written `row,col` with 1-indexed coordinates, e.g. `3,12`.

use crate::grid::Cell;

/// Errors that can occur while parsing cell notation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected 'row,col', got '{0}'")]
    MissingComma(String),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("coordinates are 1-indexed, got '{0}'")]
    ZeroCoordinate(String),
}

/// Formats a cell as `row,col`.
pub fn format_cell(cell: Cell) -> String {
    format!("{},{}", cell.row, cell.col)
}

/// Parses `row,col` into a cell. Whitespace around either number is allowed.
pub fn parse_cell(s: &str) -> Result<Cell, NotationError> {
    let (r, c) = s
        .split_once(',')
        .ok_or_else(|| NotationError::MissingComma(s.to_string()))?;
    let row = parse_coordinate(r)?;
    let col = parse_coordinate(c)?;
    if row == 0 || col == 0 {
        return Err(NotationError::ZeroCoordinate(s.to_string()));
    }
    Ok(Cell::new(row, col))
}

fn parse_coordinate(s: &str) -> Result<u16, NotationError> {
    s.trim()
        .parse::<u16>()
        .map_err(|_| NotationError::InvalidCoordinate(s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_parse() {
        let c = Cell::new(3, 12);
        assert_eq!(format_cell(c), "3,12");
        assert_eq!(parse_cell("3,12"), Ok(c));
        assert_eq!(parse_cell(" 3 , 12 "), Ok(c));
    }

    #[test]
    fn missing_comma() {
        assert_eq!(
            parse_cell("3 12"),
            Err(NotationError::MissingComma("3 12".to_string()))
        );
    }

    #[test]
    fn invalid_numbers() {
        assert!(matches!(
            parse_cell("a,1"),
            Err(NotationError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            parse_cell("1,-2"),
            Err(NotationError::InvalidCoordinate(_))
        ));
        assert!(matches!(parse_cell("1,"), Err(NotationError::InvalidCoordinate(_))));
    }

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(parse_cell("0,1"), Err(NotationError::ZeroCoordinate(_))));
    }
}
