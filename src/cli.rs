use crate::config::CarouselConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

const USAGE: &str = "Usage: planet_carousel [--config <path>] [--width <px>] [--height <px>] [--throttle-ms <ms>]";

/// Command-line overrides layered on top of the JSON config. Flags accept `--flag value`
/// or `--flag=value`; a repeated flag keeps its last value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    throttle_ms: Option<u64>,
}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().with_context(|| format!("Invalid value '{value}' for --{flag}"))
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    /// Parses flags only; the program name must already be stripped.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliOverrides::default();
        let mut args = args.into_iter().map(|arg| arg.as_ref().to_owned());
        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                bail!("Unexpected argument '{arg}'. {USAGE}");
            };
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name.to_owned(), value.to_owned()),
                None => {
                    let value = args.next().ok_or_else(|| anyhow!("Missing value for --{flag}. {USAGE}"))?;
                    (flag.to_owned(), value)
                }
            };
            match name.as_str() {
                "config" => parsed.config = Some(PathBuf::from(value)),
                "width" => parsed.width = Some(parse_number(&name, &value)?),
                "height" => parsed.height = Some(parse_number(&name, &value)?),
                "throttle-ms" => parsed.throttle_ms = Some(parse_number(&name, &value)?),
                _ => bail!("Unknown flag '--{name}'. {USAGE}"),
            }
        }
        Ok(parsed)
    }

    pub fn into_config_overrides(self) -> CarouselConfigOverrides {
        CarouselConfigOverrides {
            config_path: self.config,
            width: self.width,
            height: self.height,
            throttle_ms: self.throttle_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_and_inline_values_both_parse() {
        let args = ["--config", "demo.json", "--width=1600", "--height", "900", "--throttle-ms=500"];
        let overrides = CliOverrides::parse(args).expect("parse overrides").into_config_overrides();
        assert_eq!(overrides.config_path, Some(PathBuf::from("demo.json")));
        assert_eq!(overrides.width, Some(1600));
        assert_eq!(overrides.height, Some(900));
        assert_eq!(overrides.throttle_ms, Some(500));
        assert_eq!(overrides.applied_fields(), vec!["width", "height", "throttle_ms"]);
    }

    #[test]
    fn repeated_flag_keeps_last_value() {
        let overrides = CliOverrides::parse(["--throttle-ms", "800", "--throttle-ms=0"]).expect("parse overrides");
        assert_eq!(overrides.throttle_ms, Some(0));
        assert_eq!(overrides.width, None);
    }

    #[test]
    fn no_arguments_means_no_overrides() {
        let overrides = CliOverrides::parse(Vec::<String>::new()).expect("parse overrides");
        assert!(overrides.into_config_overrides().is_empty());
    }

    #[test]
    fn bad_input_is_reported() {
        let missing = CliOverrides::parse(["--height"]).unwrap_err();
        assert!(missing.to_string().contains("Missing value for --height"));
        let unknown = CliOverrides::parse(["--vsync=on"]).unwrap_err();
        assert!(unknown.to_string().contains("Unknown flag '--vsync'"));
        let positional = CliOverrides::parse(["scene.json"]).unwrap_err();
        assert!(positional.to_string().contains("Unexpected argument"));
        let not_a_number = CliOverrides::parse(["--throttle-ms", "soon"]).unwrap_err();
        assert!(format!("{not_a_number:#}").contains("Invalid value 'soon' for --throttle-ms"));
    }
}
