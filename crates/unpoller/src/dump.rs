// --dumpjson
//
// `kind[:unit] [path]` becomes a raw-fetch filter for the UniFi input.

use unpoller_core::{Filter, Input, UnifiInput};

use crate::error::CliError;

const KINDS: &[&str] = &["d", "device", "devices", "c", "client", "clients", "o", "other"];

pub fn parse_spec(spec: &str) -> Result<Filter, CliError> {
    let invalid = |reason: &str| CliError::DumpSpec {
        spec: spec.to_owned(),
        reason: reason.to_owned(),
    };

    let mut parts = spec.split_whitespace();
    let head = parts.next().ok_or_else(|| invalid("empty"))?;
    let path = parts.collect::<Vec<_>>().join(" ");

    let (kind, unit) = match head.split_once(':') {
        Some((kind, unit)) => {
            let unit = unit
                .parse::<usize>()
                .map_err(|_| invalid("controller index must be a number"))?;
            (kind, unit)
        }
        None => (head, 0),
    };

    let kind = kind.to_ascii_lowercase();
    if !KINDS.contains(&kind.as_str()) {
        return Err(invalid("must provide filter: devices, clients, other"));
    }
    if matches!(kind.as_str(), "o" | "other") && path.is_empty() {
        return Err(invalid("'other' requires a path, e.g. 'other /api/s/default/rest/user'"));
    }

    Ok(Filter {
        kind,
        unit,
        path,
        ..Filter::default()
    })
}

/// Fetch the raw JSON for `spec` and print it to stdout.
pub async fn dump_json(input: &UnifiInput, spec: &str) -> Result<(), CliError> {
    let filter = parse_spec(spec)?;
    let body = input.raw_metrics(&filter).await?;
    println!("{body}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_unit() {
        let filter = parse_spec("d:2").unwrap();
        assert_eq!(filter.kind, "d");
        assert_eq!(filter.unit, 2);
        assert!(filter.path.is_empty());

        let filter = parse_spec("Clients").unwrap();
        assert_eq!(filter.kind, "clients");
        assert_eq!(filter.unit, 0);
    }

    #[test]
    fn other_takes_a_path() {
        let filter = parse_spec("other:1 /api/s/default/rest/user").unwrap();
        assert_eq!(filter.kind, "other");
        assert_eq!(filter.unit, 1);
        assert_eq!(filter.path, "/api/s/default/rest/user");

        assert!(matches!(parse_spec("o"), Err(CliError::DumpSpec { .. })));
    }

    #[test]
    fn bad_specs() {
        assert!(matches!(parse_spec(""), Err(CliError::DumpSpec { .. })));
        assert!(matches!(parse_spec("sites"), Err(CliError::DumpSpec { .. })));
        assert!(matches!(parse_spec("d:x"), Err(CliError::DumpSpec { .. })));
    }
}
