use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;

use super::model::{Direction, FormatType, Header, Traj};
use super::point::Point;
use crate::error::{MalformedRecordError, TrajParseError};

/// Two-digit years in record 6 are offsets from this year.
pub const YEAR_BASE: i32 = 2000;

/// Columns of a record 6 line that precede the variable values.
const FIXED_FIELDS: usize = 12;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

impl Traj {
    /// Read and parse a trajectory endpoint file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Traj, TrajParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let traj = Self::parse_str(path, &text)?;
        debug!("parsed {} from {}", traj, path.display());
        Ok(traj)
    }

    /// Parse trajectory text already in memory; `path` becomes its identity.
    pub fn parse_str(path: impl Into<PathBuf>, text: &str) -> Result<Traj, TrajParseError> {
        let mut records = Records::new(text);

        // ---- record 1: grid count [+ format token] ----
        let (line, r1) = records.next_line(1)?;
        require_tokens(1, &r1, 1).map_err(malformed(line))?;
        let num_grids: usize = parse_field(1, "num_grids", r1[0]).map_err(malformed(line))?;
        let format = if r1.len() == 1 {
            FormatType::Old
        } else {
            FormatType::New
        };

        // ---- record 2: one line per grid ----
        let grids = records.verbatim(2, num_grids)?;

        // ---- record 3: trajectory count, direction, method ----
        let (line, r3) = records.next_line(3)?;
        require_tokens(3, &r3, 3).map_err(malformed(line))?;
        let num_trajs: usize = parse_field(3, "num_trajs", r3[0]).map_err(malformed(line))?;
        let direction = Direction::from_str(r3[1]).map_err(malformed(line))?;
        let method = r3[2].to_string();

        // ---- record 4: one line per trajectory ----
        let starting_info = records.verbatim(4, num_trajs)?;

        // ---- record 5: variable header ----
        let (line, r5) = records.next_line(5)?;
        let vars = parse_var_header(&r5).map_err(malformed(line))?;

        // ---- record 6: points until end of input ----
        let mut points = Vec::new();
        for (line, text) in records.remaining() {
            if text.trim().is_empty() {
                continue;
            }
            points.push(Point::parse(text, &vars).map_err(malformed(line))?);
        }

        let header = Header {
            format,
            grids,
            direction,
            method,
            starting_info,
            vars,
        };
        Traj::assemble(path.into(), header, points)
    }
}

impl Point {
    /// Parse one record 6 line against the trajectory's variable names.
    ///
    /// Columns 0–11 are positional metadata; the rest are the variable values
    /// in header order. The line must carry exactly one value per variable.
    pub fn parse(line: &str, vars: &Arc<[String]>) -> Result<Point, MalformedRecordError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let expected = FIXED_FIELDS + vars.len();
        require_tokens(6, &tokens, expected)?;
        if tokens.len() != expected {
            return Err(MalformedRecordError::TokenCount {
                record: 6,
                expected,
                found: tokens.len(),
            });
        }

        let year = parse_field::<i32>(6, "year", tokens[2])?
            .checked_add(YEAR_BASE)
            .ok_or_else(|| MalformedRecordError::InvalidNumber {
                record: 6,
                field: "year",
                token: tokens[2].to_string(),
            })?;
        let month = parse_field::<u32>(6, "month", tokens[3])?;
        let day = parse_field::<u32>(6, "day", tokens[4])?;
        let hour = parse_field::<u32>(6, "hour", tokens[5])?;
        let minute = parse_field::<u32>(6, "minute", tokens[6])?;
        let datetime = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .ok_or(MalformedRecordError::InvalidTimestamp {
                year,
                month,
                day,
                hour,
                minute,
            })?;

        let values = tokens[FIXED_FIELDS..]
            .iter()
            .map(|tok| parse_field::<f64>(6, "value", tok))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Point {
            traj_num: parse_field(6, "traj_num", tokens[0])?,
            grid_num: parse_field(6, "grid_num", tokens[1])?,
            datetime,
            forecast_hour: parse_field(6, "forecast_hour", tokens[7])?,
            traj_age: parse_field(6, "traj_age", tokens[8])?,
            lat: parse_field(6, "lat", tokens[9])?,
            lon: parse_field(6, "lon", tokens[10])?,
            height: parse_field(6, "height", tokens[11])?,
            vars: Arc::clone(vars),
            values,
        })
    }
}

// ---------------------------------------------------------------------------
// Record helpers
// ---------------------------------------------------------------------------

/// Line cursor over the file; line numbers are 1-based.
struct Records<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Records {
            lines: text.lines().enumerate(),
        }
    }

    fn next_line(&mut self, record: u8) -> Result<(usize, Vec<&'a str>), TrajParseError> {
        let (idx, text) = self
            .lines
            .next()
            .ok_or(TrajParseError::MissingRecord { record })?;
        Ok((idx + 1, text.split_whitespace().collect()))
    }

    /// `count` lines kept as raw token tuples.
    fn verbatim(&mut self, record: u8, count: usize) -> Result<Vec<Vec<String>>, TrajParseError> {
        (0..count)
            .map(|_| {
                let (_, tokens) = self.next_line(record)?;
                Ok(tokens.into_iter().map(str::to_string).collect())
            })
            .collect()
    }

    fn remaining(self) -> impl Iterator<Item = (usize, &'a str)> {
        self.lines.map(|(idx, text)| (idx + 1, text))
    }
}

fn malformed(line: usize) -> impl Fn(MalformedRecordError) -> TrajParseError {
    move |source| TrajParseError::Malformed { line, source }
}

fn require_tokens(record: u8, tokens: &[&str], expected: usize) -> Result<(), MalformedRecordError> {
    if tokens.len() < expected {
        return Err(MalformedRecordError::TooFewTokens {
            record,
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

fn parse_field<T: FromStr>(
    record: u8,
    field: &'static str,
    token: &str,
) -> Result<T, MalformedRecordError> {
    token
        .parse::<T>()
        .map_err(|_| MalformedRecordError::InvalidNumber {
            record,
            field,
            token: token.to_string(),
        })
}

/// Record 5: `<n> <name_1> ... <name_n>`; names must be unique.
fn parse_var_header(tokens: &[&str]) -> Result<Arc<[String]>, MalformedRecordError> {
    require_tokens(5, tokens, 1)?;
    let num_vars: usize = parse_field(5, "num_vars", tokens[0])?;
    if num_vars > tokens.len() - 1 {
        return Err(MalformedRecordError::TooFewTokens {
            record: 5,
            expected: num_vars.saturating_add(1),
            found: tokens.len(),
        });
    }

    let mut vars: Vec<String> = Vec::with_capacity(num_vars);
    for name in &tokens[1..=num_vars] {
        if vars.iter().any(|v| v == name) {
            return Err(MalformedRecordError::DuplicateVariable(name.to_string()));
        }
        vars.push(name.to_string());
    }
    Ok(vars.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BACKWARD: &str = "\
     1     1
    GDAS1    19     1     1     0     0
     1 BACKWARD    OMEGA
    19     1     1    12    40.000   -75.000    500.0
     2 PRESSURE TEMP
     1     1    19     1     1    12     0     0     0.0   40.000  -75.000    500.0    950.2    285.1
     1     1    19     1     1    11     0     0    -1.0   40.120  -75.310    520.4    948.7    284.6
     1     1    19     1     1    10     0     0    -2.0   40.250  -75.640    545.9    946.1    283.9
";

    fn with_line(base: &str, line_no: usize, replacement: &str) -> String {
        base.lines()
            .enumerate()
            .map(|(i, l)| if i + 1 == line_no { replacement } else { l })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn parses_all_six_records() {
        let traj = Traj::parse_str("data/backward.traj", BACKWARD).unwrap();

        assert_eq!(traj.format(), FormatType::New);
        assert_eq!(traj.grid_count(), 1);
        assert_eq!(traj.grids()[0][0], "GDAS1");
        assert_eq!(traj.trajectory_count(), 1);
        assert_eq!(traj.direction(), Direction::Backward);
        assert_eq!(traj.method(), "OMEGA");
        assert_eq!(traj.starting_info()[0].len(), 7);
        assert_eq!(traj.vars(), ["PRESSURE", "TEMP"]);
        assert_eq!(traj.len(), 3);
    }

    #[test]
    fn backward_target_and_totals() {
        let traj = Traj::parse_str("data/backward.traj", BACKWARD).unwrap();

        assert_eq!(traj.target_point(), &traj.points()[0]);
        assert_relative_eq!(traj.total("TEMP").unwrap(), 285.1 + 284.6 + 283.9, epsilon = 1e-9);
        assert_eq!(traj.min("TEMP"), Some(283.9));
        assert_eq!(traj.max("PRESSURE"), Some(950.2));
    }

    #[test]
    fn point_fields_are_positional() {
        let traj = Traj::parse_str("data/backward.traj", BACKWARD).unwrap();
        let p = &traj.points()[1];

        assert_eq!(p.traj_num(), 1);
        assert_eq!(p.grid_num(), 1);
        assert_eq!(p.year(), 2019);
        assert_eq!((p.month(), p.day(), p.hour(), p.minute()), (1, 1, 11, 0));
        assert_eq!(p.forecast_hour(), 0);
        assert_eq!(p.traj_age(), -1.0);
        assert_eq!(p.coords(), (40.12, -75.31));
        assert_eq!(p.height(), 520.4);
        assert_eq!(p.value("PRESSURE"), Some(948.7));
        assert_eq!(p.value("RAIN"), None);
        let names: Vec<&str> = p.data().map(|(name, _)| name).collect();
        assert_eq!(names, ["PRESSURE", "TEMP"]);
        assert_eq!(p.to_string(), "(40.12, -75.31) 2019-01-01 11:00:00");
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let text = format!("{BACKWARD}\n   \n");
        let traj = Traj::parse_str("x", &text).unwrap();
        assert_eq!(traj.len(), 3);
    }

    #[test]
    fn header_without_points_is_rejected() {
        let text: String = BACKWARD.lines().take(5).collect::<Vec<_>>().join("\n");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(err, TrajParseError::NoPoints));
    }

    #[test]
    fn short_file_reports_missing_record() {
        let text: String = BACKWARD.lines().take(3).collect::<Vec<_>>().join("\n");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(err, TrajParseError::MissingRecord { record: 4 }));
    }

    #[test]
    fn non_numeric_count_is_malformed() {
        let text = with_line(BACKWARD, 3, "one BACKWARD OMEGA");
        let err = Traj::parse_str("x", &text).unwrap_err();
        match err {
            TrajParseError::Malformed { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(
                    source,
                    MalformedRecordError::InvalidNumber { field: "num_trajs", .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_direction_is_malformed() {
        let text = with_line(BACKWARD, 3, "1 SIDEWAYS OMEGA");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(
            err,
            TrajParseError::Malformed {
                source: MalformedRecordError::UnknownDirection(_),
                ..
            }
        ));
    }

    #[test]
    fn duplicate_variable_is_malformed() {
        let text = with_line(BACKWARD, 5, "2 TEMP TEMP");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(
            err,
            TrajParseError::Malformed {
                line: 5,
                source: MalformedRecordError::DuplicateVariable(_),
            }
        ));
    }

    #[test]
    fn short_point_line_fails_whole_file() {
        let text = with_line(BACKWARD, 7, "1 1 19 1 1 11 0 0 -1.0 40.12 -75.31 520.4 948.7");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(
            err,
            TrajParseError::Malformed {
                line: 7,
                source: MalformedRecordError::TooFewTokens { record: 6, expected: 14, found: 13 },
            }
        ));
    }

    #[test]
    fn extra_point_value_is_rejected() {
        let vars: Arc<[String]> = vec!["TEMP".to_string()].into();
        let err = Point::parse("1 1 19 1 1 11 0 0 -1.0 40.12 -75.31 520.4 1.0 2.0", &vars).unwrap_err();
        assert_eq!(
            err,
            MalformedRecordError::TokenCount { record: 6, expected: 13, found: 14 }
        );
    }

    #[test]
    fn impossible_date_is_rejected() {
        let vars: Arc<[String]> = vec!["TEMP".to_string()].into();
        let err = Point::parse("1 1 19 2 30 11 0 0 -1.0 40.12 -75.31 520.4 1.0", &vars).unwrap_err();
        assert!(matches!(err, MalformedRecordError::InvalidTimestamp { month: 2, day: 30, .. }));
    }

    #[test]
    fn oversized_variable_count_is_malformed() {
        let text = with_line(BACKWARD, 5, "18446744073709551615 PRESSURE TEMP");
        let err = Traj::parse_str("x", &text).unwrap_err();
        assert!(matches!(
            err,
            TrajParseError::Malformed {
                line: 5,
                source: MalformedRecordError::TooFewTokens { record: 5, expected: usize::MAX, found: 3 },
            }
        ));
    }

    #[test]
    fn out_of_range_year_is_malformed() {
        let vars: Arc<[String]> = vec!["TEMP".to_string()].into();
        let err = Point::parse("1 1 2147483647 1 1 11 0 0 -1.0 40.12 -75.31 520.4 1.0", &vars).unwrap_err();
        assert!(matches!(err, MalformedRecordError::InvalidNumber { record: 6, field: "year", .. }));
    }
}
