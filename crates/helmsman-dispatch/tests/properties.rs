//! Property-based tests for tree resolution and flag precedence.

use helmsman_dispatch::{
    resolve_flags, Command, CommandTree, Flag, HandlerResult, MapConfig, NoConfig, Output,
    ValueSource,
};
use helmsman_input::MockEnv;
use proptest::prelude::*;

fn ok(_: &helmsman_dispatch::Context, _: &mut helmsman_dispatch::Io<'_>) -> HandlerResult {
    Ok(Output::Silent)
}

fn tree() -> CommandTree {
    CommandTree::build(
        Command::new("app")
            .run(ok)
            .subcommand(Command::new("alpha").alias("a").run(ok))
            .subcommand(
                Command::new("beta")
                    .run(ok)
                    .subcommand(Command::new("gamma").alias("g").run(ok)),
            ),
    )
    .unwrap()
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alpha".to_string()),
        Just("a".to_string()),
        Just("beta".to_string()),
        Just("gamma".to_string()),
        Just("g".to_string()),
        Just("--flag".to_string()),
        "[a-z]{1,5}",
    ]
}

proptest! {
    #[test]
    fn resolve_is_deterministic(tokens in prop::collection::vec(token(), 0..6)) {
        let tree = tree();
        prop_assert_eq!(tree.resolve(&tokens), tree.resolve(&tokens));
    }

    #[test]
    fn resolution_splits_tokens(tokens in prop::collection::vec(token(), 0..6)) {
        let tree = tree();
        let resolution = tree.resolve(&tokens).unwrap();
        let consumed = resolution.path.len() - 1;
        prop_assert_eq!(&resolution.remaining[..], &tokens[consumed..]);
        // every consumed token named the node it matched
        for (token, id) in tokens.iter().zip(resolution.path.iter().skip(1)) {
            let node = tree.node(*id);
            prop_assert!(node.name() == token || node.aliases().contains(token));
        }
    }

    #[test]
    fn precedence_holds_regardless_of_declaration_order(
        cli in proptest::option::of(0i64..1000),
        env in proptest::option::of(0i64..1000),
        config in proptest::option::of(0i64..1000),
        default in proptest::option::of(0i64..1000),
        first in any::<bool>(),
    ) {
        let mut port = Flag::integer("port").env("APP_PORT");
        if let Some(d) = default {
            port = port.default(d.to_string());
        }
        let other = Flag::boolean("verbose");
        let flags: Vec<&Flag> = if first { vec![&port, &other] } else { vec![&other, &port] };

        let tokens: Vec<String> = cli
            .map(|c| vec!["--port".to_string(), c.to_string()])
            .unwrap_or_default();
        let mock_env = env
            .map(|e| MockEnv::new().with_var("APP_PORT", e.to_string()))
            .unwrap_or_default();
        let map = config
            .map(|c| MapConfig::new().with("port", c.to_string()))
            .unwrap_or_default();

        let resolved = resolve_flags(&flags, &tokens, &mock_env, &map, &[]).unwrap();
        let expected = cli
            .map(|v| (v, ValueSource::Cli))
            .or(env.map(|v| (v, ValueSource::Env)))
            .or(config.map(|v| (v, ValueSource::Config)))
            .or(default.map(|v| (v, ValueSource::Default)));

        match expected {
            Some((value, source)) => {
                prop_assert_eq!(resolved.values.integer("port"), Some(value));
                prop_assert_eq!(resolved.values.source("port"), Some(source));
            }
            None => prop_assert!(!resolved.values.contains("port")),
        }
    }

    #[test]
    fn boolean_last_occurrence_wins(toggles in prop::collection::vec(any::<bool>(), 1..8)) {
        let flag = Flag::boolean("verbose");
        let tokens: Vec<String> = toggles
            .iter()
            .map(|&on| if on { "--verbose" } else { "--no-verbose" }.to_string())
            .collect();
        let resolved = resolve_flags(&[&flag], &tokens, &MockEnv::new(), &NoConfig, &[]).unwrap();
        prop_assert_eq!(resolved.values.boolean("verbose"), *toggles.last().unwrap());
    }
}
