//! Integer lists from text. Values are separated by whitespace and/or commas; `#` starts a
//! comment that runs to the end of the line.

use histobar_common::{HistobarError, Result};
use std::io::BufRead;

pub fn parse_samples(text: &str) -> Result<Vec<i64>> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        parse_line(line, idx + 1, &mut values)?;
    }
    Ok(values)
}

pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<i64>> {
    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        parse_line(&line?, idx + 1, &mut values)?;
    }
    Ok(values)
}

/// Like [`parse_samples`], but an empty list is an error since it cannot bound any category.
pub fn parse_boundaries(text: &str) -> Result<Vec<i64>> {
    let values = parse_samples(text)?;
    if values.is_empty() {
        return Err(HistobarError::EmptyInput("category boundaries"));
    }
    Ok(values)
}

fn parse_line(line: &str, line_no: usize, out: &mut Vec<i64>) -> Result<()> {
    let content = line.split_once('#').map_or(line, |(head, _)| head);
    for token in content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let value = token.parse::<i64>().map_err(|_| HistobarError::Parse {
            line: line_no,
            token: token.to_string(),
        })?;
        out.push(value);
    }
    Ok(())
}
