//! Line-oriented CTL descriptor scanner.

use chrono::NaiveDate;

use crate::descriptor::{ByteOrder, GridDescriptor, TdefPrefix};
use crate::error::{CtlError, Result};

/// Parse CTL descriptor text into a validated [`GridDescriptor`].
///
/// The scanner walks the text line by line, splits each line on whitespace,
/// and dispatches on the first token. Directives it does not handle (`DSET`,
/// `ZDEF`, `VARS`, ...) are skipped without error; the four mandatory ones
/// are `UNDEF`, `XDEF`, `YDEF`, and `TDEF`. Token counts are checked before
/// any positional access so a truncated line fails with a named directive
/// instead of mis-parsing.
///
/// `tdef_prefix` selects how the TDEF start-date token is interpreted; see
/// [`TdefPrefix`].
pub fn parse_descriptor(text: &str, tdef_prefix: TdefPrefix) -> Result<GridDescriptor> {
    let mut fill_value: Option<f32> = None;
    let mut xdef: Option<(usize, f64, f64)> = None;
    let mut ydef: Option<(usize, f64, f64)> = None;
    let mut start_date: Option<NaiveDate> = None;
    let mut byte_order = ByteOrder::LittleEndian;
    let mut title = String::new();
    let mut variable_description = String::new();

    for line in text.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&keyword) = words.first() else {
            continue;
        };

        match keyword {
            "UNDEF" => {
                require_tokens("UNDEF", &words, 2)?;
                fill_value = Some(parse_number("UNDEF", words[1])?);
            }
            "XDEF" => {
                xdef = Some(parse_axis("XDEF", &words)?);
            }
            "YDEF" => {
                ydef = Some(parse_axis("YDEF", &words)?);
            }
            "TDEF" => {
                require_tokens("TDEF", &words, 4)?;
                start_date = Some(parse_tdef_date(words[3], tdef_prefix)?);
            }
            "OPTIONS" => {
                // the third token names the byte order; anything else means
                // the little-endian default applies
                if words.len() >= 3 && words[2] == "big_endian" {
                    byte_order = ByteOrder::BigEndian;
                }
            }
            "TITLE" => {
                title = words[1..].join(" ");
            }
            "cmorph" => {
                if words.len() > 4 {
                    variable_description = words[4..].join(" ");
                }
            }
            _ => {}
        }
    }

    let fill_value = fill_value.ok_or(CtlError::MissingDirective("UNDEF"))?;
    let (lon_count, lon_origin, lon_increment) = xdef.ok_or(CtlError::MissingDirective("XDEF"))?;
    let (lat_count, lat_origin, lat_increment) = ydef.ok_or(CtlError::MissingDirective("YDEF"))?;
    let start_date = start_date.ok_or(CtlError::MissingDirective("TDEF"))?;

    Ok(GridDescriptor {
        lon_count,
        lon_origin,
        lon_increment,
        lat_count,
        lat_origin,
        lat_increment,
        byte_order,
        fill_value,
        start_date,
        title,
        variable_description,
    })
}

/// Parse an `XDEF`/`YDEF` line into `(count, origin, increment)`.
///
/// The directive layout is `XDEF <count> LINEAR <origin> <increment>`; the
/// count must be positive and the increment strictly positive (coordinate
/// axes are ascending).
fn parse_axis(directive: &'static str, words: &[&str]) -> Result<(usize, f64, f64)> {
    require_tokens(directive, words, 5)?;

    let count: usize = parse_number(directive, words[1])?;
    let origin: f64 = parse_number(directive, words[3])?;
    let increment: f64 = parse_number(directive, words[4])?;

    if count == 0 {
        return Err(CtlError::malformed(directive, "axis count must be positive"));
    }
    if increment <= 0.0 {
        return Err(CtlError::malformed(
            directive,
            format!("axis increment {} must be positive", increment),
        ));
    }

    Ok((count, origin, increment))
}

/// Parse the TDEF start-date token, stripping the hour marker when the
/// prefix mode calls for one.
fn parse_tdef_date(token: &str, prefix: TdefPrefix) -> Result<NaiveDate> {
    let date_token = match prefix {
        TdefPrefix::None => token,
        TdefPrefix::Hour => token.get(3..).unwrap_or(""),
    };

    NaiveDate::parse_from_str(date_token, "%d%b%Y").map_err(|_| {
        CtlError::malformed("TDEF", format!("invalid start-date token '{}'", token))
    })
}

fn require_tokens(directive: &'static str, words: &[&str], count: usize) -> Result<()> {
    if words.len() < count {
        return Err(CtlError::malformed(
            directive,
            format!("expected at least {} tokens, found {}", count, words.len()),
        ));
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(directive: &'static str, token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| CtlError::malformed(directive, format!("invalid numeric token '{}'", token)))
}
