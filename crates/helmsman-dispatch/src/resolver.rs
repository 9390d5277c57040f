//! Flag value resolution.
//!
//! Given the flags visible at the matched command, the tokens left after the
//! tree walk, the environment and a configuration source, produce one typed
//! value per flag destination:
//!
//! ```text
//! command line  >  environment  >  configuration  >  default
//! ```
//!
//! Tokens that are not flags pass through, in order, for argument binding.
//! The resolver never prompts.

use std::collections::{HashMap, VecDeque};

use helmsman_input::EnvReader;
use tracing::debug;

use crate::config::ConfigSource;
use crate::error::UsageError;
use crate::flags::{Flag, FlagValues, Value, ValueSource};

/// The resolver's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFlags {
    pub values: FlagValues,
    /// Leftover positional tokens, in command-line order.
    pub positionals: Vec<String>,
}

/// Resolve `flags` against `tokens`, `env` and `config`.
///
/// `command_path` is handed to the configuration source to scope lookups.
pub fn resolve_flags(
    flags: &[&Flag],
    tokens: &[String],
    env: &dyn EnvReader,
    config: &dyn ConfigSource,
    command_path: &[String],
) -> Result<ResolvedFlags, UsageError> {
    let Scan { cli, positionals } = scan(flags, tokens)?;
    let mut leftovers: VecDeque<String> = positionals.into();
    let mut values = FlagValues::new();

    for flag in flags {
        let name = flag.name();
        let resolved = if let Some(literal) = cli.get(name) {
            Some((coerce(flag, literal)?, ValueSource::Cli))
        } else if let Some(token) = flag
            .is_positional()
            .then(|| leftovers.pop_front())
            .flatten()
        {
            Some((coerce(flag, &token)?, ValueSource::Cli))
        } else if let Some(literal) = flag
            .env_var()
            .and_then(|var| env.var(var))
            .filter(|v| !v.is_empty())
        {
            Some((coerce(flag, &literal)?, ValueSource::Env))
        } else if let Some(json) = config.lookup(command_path, name) {
            let value = flag
                .kind()
                .from_json(&json)
                .ok_or_else(|| invalid(flag, &json_literal(&json)))?;
            Some((value, ValueSource::Config))
        } else if let Some(literal) = flag.default_literal() {
            Some((coerce(flag, literal)?, ValueSource::Default))
        } else if flag.is_boolean() && !flag.is_required() {
            Some((Value::Bool(false), ValueSource::Default))
        } else {
            None
        };

        match resolved {
            Some((value, source)) => {
                debug!(flag = name, %source, %value, "resolved flag");
                values.set(flag.destination(), value, source);
            }
            None if flag.is_required() => {
                return Err(UsageError::MissingRequired(name.to_string()));
            }
            None => {}
        }
    }

    Ok(ResolvedFlags {
        values,
        positionals: leftovers.into(),
    })
}

struct Scan {
    /// Flag name to the last literal given for it.
    cli: HashMap<String, String>,
    positionals: Vec<String>,
}

fn scan(flags: &[&Flag], tokens: &[String]) -> Result<Scan, UsageError> {
    let mut cli = HashMap::new();
    let mut positionals = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if token == "--" {
            positionals.extend(iter.by_ref().cloned());
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let flag = match find_long(flags, name) {
                Some(flag) => flag,
                None => match negated(flags, name, inline) {
                    Some(flag) => {
                        cli.insert(flag.name().to_string(), "false".to_string());
                        continue;
                    }
                    None => return Err(UsageError::UnknownFlag(format!("--{name}"))),
                },
            };
            let literal = take_value(flag, inline, &mut iter, || format!("--{name}"))?;
            cli.insert(flag.name().to_string(), literal);
        } else if is_short(token) {
            let mut chars = token[1..].chars();
            let Some(short) = chars.next() else {
                positionals.push(token.clone());
                continue;
            };
            let tail = chars.as_str();
            let flag = flags
                .iter()
                .copied()
                .find(|f| f.short_name() == Some(short))
                .ok_or_else(|| UsageError::UnknownFlag(token.clone()))?;
            let inline = match tail.strip_prefix('=') {
                Some(value) => Some(value),
                None if tail.is_empty() => None,
                // clusters of short booleans are not supported
                None if flag.is_boolean() => return Err(UsageError::UnknownFlag(token.clone())),
                None => Some(tail),
            };
            let literal = take_value(flag, inline, &mut iter, || format!("-{short}"))?;
            cli.insert(flag.name().to_string(), literal);
        } else {
            positionals.push(token.clone());
        }
    }

    Ok(Scan { cli, positionals })
}

/// `-x...` where `x` is not a digit. A lone `-` and negative numbers are
/// positional.
fn is_short(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c != '-' && !c.is_ascii_digit())
}

fn find_long<'f>(flags: &[&'f Flag], name: &str) -> Option<&'f Flag> {
    flags.iter().copied().find(|f| f.name() == name)
}

/// `--no-name` for a boolean `name`.
fn negated<'f>(flags: &[&'f Flag], name: &str, inline: Option<&str>) -> Option<&'f Flag> {
    if inline.is_some() {
        return None;
    }
    let base = name.strip_prefix("no-")?;
    find_long(flags, base).filter(|f| f.is_boolean())
}

fn take_value<'t>(
    flag: &Flag,
    inline: Option<&str>,
    rest: &mut impl Iterator<Item = &'t String>,
    spelled: impl FnOnce() -> String,
) -> Result<String, UsageError> {
    match inline {
        Some(value) => Ok(value.to_string()),
        None if flag.is_boolean() => Ok("true".to_string()),
        None => rest
            .next()
            .cloned()
            .ok_or_else(|| UsageError::MissingFlagValue(spelled())),
    }
}

fn coerce(flag: &Flag, literal: &str) -> Result<Value, UsageError> {
    flag.kind()
        .parse(literal)
        .ok_or_else(|| invalid(flag, literal))
}

fn invalid(flag: &Flag, literal: &str) -> UsageError {
    UsageError::InvalidValue {
        flag: flag.name().to_string(),
        literal: literal.to_string(),
        kind: flag.kind(),
    }
}

fn json_literal(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, NoConfig};
    use crate::flags::FlagKind;
    use helmsman_input::MockEnv;
    use serde_json::json;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(flags: &[Flag], args: &[&str]) -> Result<ResolvedFlags, UsageError> {
        run_with(flags, args, &MockEnv::new(), &NoConfig)
    }

    fn run_with(
        flags: &[Flag],
        args: &[&str],
        env: &dyn EnvReader,
        config: &dyn ConfigSource,
    ) -> Result<ResolvedFlags, UsageError> {
        let refs: Vec<&Flag> = flags.iter().collect();
        resolve_flags(&refs, &tokens(args), env, config, &[])
    }

    #[test]
    fn long_and_short_forms() {
        let flags = [
            Flag::string("name").short('n'),
            Flag::integer("count").short('c'),
        ];
        let cases: [&[&str]; 4] = [
            &["--name", "x", "--count", "3"],
            &["--name=x", "--count=3"],
            &["-n", "x", "-c", "3"],
            &["-n=x", "-c3"],
        ];
        for args in cases {
            let resolved = run(&flags, args).unwrap();
            assert_eq!(resolved.values.string("name"), Some("x"), "{args:?}");
            assert_eq!(resolved.values.integer("count"), Some(3), "{args:?}");
            assert_eq!(resolved.values.source("count"), Some(ValueSource::Cli));
        }
    }

    #[test]
    fn boolean_presence_negation_and_last_wins() {
        let flags = [Flag::boolean("verbose").short('v')];
        assert!(run(&flags, &["--verbose"]).unwrap().values.boolean("verbose"));
        assert!(!run(&flags, &["--no-verbose"]).unwrap().values.boolean("verbose"));
        assert!(!run(&flags, &["--verbose", "--no-verbose"]).unwrap().values.boolean("verbose"));
        assert!(run(&flags, &["--no-verbose", "-v"]).unwrap().values.boolean("verbose"));
        assert!(!run(&flags, &["--verbose=false"]).unwrap().values.boolean("verbose"));
    }

    #[test]
    fn unset_boolean_is_false_from_default() {
        let resolved = run(&[Flag::boolean("dry-run")], &[]).unwrap();
        assert_eq!(resolved.values.get("dry-run"), Some(&Value::Bool(false)));
        assert_eq!(resolved.values.source("dry-run"), Some(ValueSource::Default));
    }

    #[test]
    fn boolean_does_not_consume_next_token() {
        let resolved = run(&[Flag::boolean("force")], &["--force", "file.txt"]).unwrap();
        assert_eq!(resolved.positionals, tokens(&["file.txt"]));
    }

    #[test]
    fn unknown_flags_are_errors() {
        assert_eq!(
            run(&[], &["--bogus=1"]).unwrap_err(),
            UsageError::UnknownFlag("--bogus".into())
        );
        assert_eq!(
            run(&[], &["-x"]).unwrap_err(),
            UsageError::UnknownFlag("-x".into())
        );
        assert_eq!(
            run(&[], &["-xyz"]).unwrap_err(),
            UsageError::UnknownFlag("-xyz".into())
        );
        assert_eq!(
            run(&[Flag::string("color")], &["--no-color"]).unwrap_err(),
            UsageError::UnknownFlag("--no-color".into())
        );
    }

    #[test]
    fn short_boolean_clusters_are_rejected() {
        let flags = [Flag::boolean("all").short('a'), Flag::boolean("long").short('l')];
        assert_eq!(
            run(&flags, &["-al"]).unwrap_err(),
            UsageError::UnknownFlag("-al".into())
        );
    }

    #[test]
    fn missing_value_at_end() {
        assert_eq!(
            run(&[Flag::string("out").short('o')], &["-o"]).unwrap_err(),
            UsageError::MissingFlagValue("-o".into())
        );
    }

    #[test]
    fn double_dash_ends_flags() {
        let flags = [Flag::boolean("verbose")];
        let resolved = run(&flags, &["a", "--", "--verbose", "-x"]).unwrap();
        assert!(!resolved.values.boolean("verbose"));
        assert_eq!(resolved.positionals, tokens(&["a", "--verbose", "-x"]));
    }

    #[test]
    fn negative_numbers_and_dash_are_positional() {
        let resolved = run(&[], &["-5", "-", "-0.5"]).unwrap();
        assert_eq!(resolved.positionals, tokens(&["-5", "-", "-0.5"]));
    }

    #[test]
    fn flag_value_may_look_negative() {
        let resolved = run(&[Flag::integer("offset")], &["--offset", "-5"]).unwrap();
        assert_eq!(resolved.values.integer("offset"), Some(-5));
    }

    #[test]
    fn precedence_cli_env_config_default() {
        let flags = [Flag::integer("port").env("MYAPP_PORT").default("8080")];
        let env = MockEnv::new().with_var("MYAPP_PORT", "9090");
        let config = MapConfig::new().with("port", "7070");

        let resolved = run_with(&flags, &["--port", "1"], &env, &config).unwrap();
        assert_eq!(resolved.values.integer("port"), Some(1));

        let resolved = run_with(&flags, &[], &env, &config).unwrap();
        assert_eq!(resolved.values.integer("port"), Some(9090));
        assert_eq!(resolved.values.source("port"), Some(ValueSource::Env));

        let resolved = run_with(&flags, &[], &MockEnv::new(), &config).unwrap();
        assert_eq!(resolved.values.integer("port"), Some(7070));
        assert_eq!(resolved.values.source("port"), Some(ValueSource::Config));

        let resolved = run_with(&flags, &[], &MockEnv::new(), &NoConfig).unwrap();
        assert_eq!(resolved.values.integer("port"), Some(8080));
        assert_eq!(resolved.values.source("port"), Some(ValueSource::Default));
    }

    #[test]
    fn empty_env_value_is_absent() {
        let flags = [Flag::string("token").env("TOKEN").default("anon")];
        let env = MockEnv::new().with_var("TOKEN", "");
        let resolved = run_with(&flags, &[], &env, &NoConfig).unwrap();
        assert_eq!(resolved.values.string("token"), Some("anon"));
    }

    #[test]
    fn required_boolean_without_source() {
        let err = run(&[Flag::boolean("confirm").required()], &[]).unwrap_err();
        assert_eq!(err, UsageError::MissingRequired("confirm".into()));

        let resolved = run(&[Flag::boolean("confirm").required()], &["--no-confirm"]).unwrap();
        assert!(!resolved.values.boolean("confirm"));
        assert_eq!(resolved.values.source("confirm"), Some(ValueSource::Cli));
    }

    #[test]
    fn required_without_source() {
        let err = run(&[Flag::string("token").required()], &[]).unwrap_err();
        assert_eq!(err, UsageError::MissingRequired("token".into()));

        let env = MockEnv::new().with_var("TOKEN", "s3cret");
        let flags = [Flag::string("token").env("TOKEN").required()];
        assert!(run_with(&flags, &[], &env, &NoConfig).is_ok());
    }

    #[test]
    fn invalid_values_name_flag_literal_and_kind() {
        let err = run(&[Flag::integer("port")], &["--port", "http"]).unwrap_err();
        assert_eq!(
            err,
            UsageError::InvalidValue {
                flag: "port".into(),
                literal: "http".into(),
                kind: FlagKind::Integer
            }
        );

        let env = MockEnv::new().with_var("RATIO", "half");
        let err = run_with(&[Flag::float("ratio").env("RATIO")], &[], &env, &NoConfig).unwrap_err();
        assert!(matches!(err, UsageError::InvalidValue { literal, .. } if literal == "half"));

        let config = json!({ "port": true });
        let err = run_with(&[Flag::integer("port")], &[], &MockEnv::new(), &config).unwrap_err();
        assert!(matches!(err, UsageError::InvalidValue { literal, .. } if literal == "true"));
    }

    #[test]
    fn positional_flags_take_leading_leftovers() {
        let flags = [
            Flag::string("source").positional(),
            Flag::string("target").positional(),
        ];
        let resolved = run(&flags, &["a", "--target", "t", "b"]).unwrap();
        assert_eq!(resolved.values.string("source"), Some("a"));
        assert_eq!(resolved.values.string("target"), Some("t"));
        assert_eq!(resolved.positionals, tokens(&["b"]));
    }

    #[test]
    fn values_land_in_destinations() {
        let flags = [Flag::string("output").short('o').dest("out_path")];
        let resolved = run(&flags, &["-o", "x.json"]).unwrap();
        assert_eq!(resolved.values.string("out_path"), Some("x.json"));
        assert!(!resolved.values.contains("output"));
    }

    #[test]
    fn absent_optional_is_unset() {
        let resolved = run(&[Flag::string("name")], &[]).unwrap();
        assert!(resolved.values.is_empty());
    }
}
