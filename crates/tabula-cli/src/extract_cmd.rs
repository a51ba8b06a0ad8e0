use std::fs::File;
use std::io::{self, Write};

use tabula::{ExtractionOptions, Method, Rect, extract, write_tables};

use crate::cli::Cli;
use crate::page_range::parse_page_range;

pub fn run(cli: &Cli) -> Result<(), i32> {
    let options = build_options(cli)?;

    let tables = extract(&cli.file, &options).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let format = cli.format.to_output_format();
    let result = match &cli.output {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| {
                eprintln!("Error: cannot create {}: {e}", path.display());
                1
            })?;
            write_tables(&tables, format, &mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let result = write_tables(&tables, format, &mut handle);
            result.and_then(|()| handle.flush())
        }
    };
    result.map_err(|e| {
        eprintln!("Error: failed to write output: {e}");
        1
    })
}

fn build_options(cli: &Cli) -> Result<ExtractionOptions, i32> {
    let pages = parse_page_range(&cli.pages).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let method = if cli.lattice {
        Method::Lattice
    } else if cli.stream {
        Method::Stream
    } else {
        Method::Auto
    };

    let area = match &cli.area {
        Some(spec) => Some(parse_area(spec).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?),
        None => None,
    };

    let columns = match &cli.columns {
        Some(spec) => Some(parse_columns(spec).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?),
        None => None,
    };

    Ok(ExtractionOptions {
        pages,
        method,
        area,
        columns,
        guess: cli.guess,
        password: cli.password.clone(),
    })
}

/// "top,left,bottom,right" in points.
fn parse_area(spec: &str) -> Result<Rect, String> {
    let values = parse_floats(spec)?;
    if values.len() != 4 {
        return Err(format!("area needs top,left,bottom,right, got {spec:?}"));
    }
    let (top, left, bottom, right) = (values[0], values[1], values[2], values[3]);
    if bottom <= top || right <= left {
        return Err(format!("degenerate area: {spec:?}"));
    }
    Ok(Rect::from_edges(top, left, bottom, right))
}

fn parse_columns(spec: &str) -> Result<Vec<f64>, String> {
    let columns = parse_floats(spec)?;
    if columns.is_empty() {
        return Err("no column positions given".to_string());
    }
    Ok(columns)
}

fn parse_floats(spec: &str) -> Result<Vec<f64>, String> {
    spec.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number: {part:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_parses_four_edges() {
        let area = parse_area("10,20,110,220").unwrap();
        assert_eq!(area, Rect::from_edges(10.0, 20.0, 110.0, 220.0));
    }

    #[test]
    fn area_rejects_wrong_arity_and_degenerate_boxes() {
        assert!(parse_area("1,2,3").is_err());
        assert!(parse_area("100,0,50,200").is_err());
        assert!(parse_area("a,b,c,d").is_err());
    }

    #[test]
    fn columns_parse_as_floats() {
        assert_eq!(parse_columns("100,250.5").unwrap(), vec![100.0, 250.5]);
        assert!(parse_columns("1,x").is_err());
    }
}
