use crate::error::VcfVizResult;
use log;
use std::{
    fmt::{Binary, Display},
    path::Path,
    sync::Once,
};

pub type Result<T> = VcfVizResult<T>;

#[allow(unused)]
static INIT_LOG: Once = Once::new();

#[allow(unused)]
pub fn init_logger() {
    INIT_LOG.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .try_init();
    });
}

pub fn handle_error_and_exit(err: impl Display) -> ! {
    log::error!("{err}");
    std::process::exit(1);
}

pub fn try_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::vcfviz_error!(
            "Path/File does not exist: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Parses an integer field, naming the field and the offending text on failure.
pub fn parse_count(value: &str, label: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|e| {
        crate::format_error!("Invalid {label} value '{value}': {e}")
    })
}

pub fn format_number_with_commas<T>(n: T) -> String
where
    T: Display + Binary,
{
    let s = n.to_string();
    let (sign, digits) = s.strip_prefix('-').map_or(("", s.as_str()), |d| ("-", d));

    if let 0..=3 = digits.len() {
        return s;
    }

    let mut result = String::with_capacity(digits.len() + (digits.len() - 1) / 3 + sign.len());
    for (digit_count, c) in digits.chars().rev().enumerate() {
        if digit_count > 0 && digit_count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result = result.chars().rev().collect();
    if !sign.is_empty() {
        result.insert_str(0, sign);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_with_commas() {
        assert_eq!(format_number_with_commas(0usize), "0");
        assert_eq!(format_number_with_commas(999u32), "999");
        assert_eq!(format_number_with_commas(29_903usize), "29,903");
        assert_eq!(format_number_with_commas(-1_000_000i64), "-1,000,000");
    }

    #[test]
    fn test_parse_count_reports_field_name() {
        assert_eq!(parse_count("42", "DP").unwrap(), 42);
        assert_eq!(parse_count(" 7 ", "DP").unwrap(), 7);
        let err = parse_count("abc", "ALT_DP").unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("ALT_DP"));
        assert!(parse_count("-3", "DP").is_err());
    }

    #[test]
    fn test_try_exists() {
        assert!(try_exists(Path::new("/definitely/not/here.vcf")).is_err());
        assert!(try_exists(Path::new(".")).is_ok());
    }
}
