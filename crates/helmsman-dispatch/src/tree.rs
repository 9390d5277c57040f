//! The command tree.
//!
//! Commands are declared with the [`Command`] builder and frozen into a
//! [`CommandTree`], an arena of nodes indexed by [`CommandId`] with parent
//! links. Everything that can be checked without a command line is checked
//! once, in [`CommandTree::build`].

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::binder::Arg;
use crate::context::{Context, Io};
use crate::error::{BuildError, UsageError};
use crate::flags::Flag;
use crate::handler::{Handler, HandlerResult, Output};
use crate::hooks::{HookError, Hooks};

/// Index of a node in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declarative command definition.
///
/// # Example
///
/// ```
/// use helmsman_dispatch::{Arg, Command, Flag, Output};
///
/// let app = Command::new("app")
///     .flag(Flag::boolean("verbose").short('v'))
///     .subcommand(
///         Command::new("greet")
///             .alias("hello")
///             .arg(Arg::required("name").prompt("Name"))
///             .run(|ctx, _io| Ok(Output::text(format!("Hello, {}!", ctx.arg("name").unwrap_or_default())))),
///     );
/// ```
#[derive(Debug)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    about: Option<String>,
    long_about: Option<String>,
    flags: Vec<Flag>,
    args: Vec<Arg>,
    children: Vec<Command>,
    hooks: Hooks,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            about: None,
            long_about: None,
            flags: Vec::new(),
            args: Vec::new(),
            children: Vec::new(),
            hooks: Hooks::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn long_about(mut self, long_about: impl Into<String>) -> Self {
        self.long_about = Some(long_about.into());
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Replace all lifecycle hooks at once.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn pre<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Context, &mut Io<'_>) -> Result<(), HookError> + 'static,
    {
        self.hooks = self.hooks.pre(f);
        self
    }

    pub fn run<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Context, &mut Io<'_>) -> HandlerResult + 'static,
    {
        self.hooks = self.hooks.run(f);
        self
    }

    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.hooks = self.hooks.handler(handler);
        self
    }

    pub fn post<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Context, &Output, &mut Io<'_>) -> Result<(), HookError> + 'static,
    {
        self.hooks = self.hooks.post(f);
        self
    }
}

/// A frozen command node. Read-only outside the crate.
#[derive(Debug)]
pub struct Node {
    name: String,
    aliases: Vec<String>,
    about: Option<String>,
    long_about: Option<String>,
    flags: Vec<Flag>,
    args: Vec<Arg>,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
    hooks: Hooks,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn long_about(&self) -> Option<&str> {
        self.long_about.as_deref()
    }

    /// Flags declared on this node only.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    /// A router has no run handler and dispatches only to its children.
    pub fn is_router(&self) -> bool {
        !self.hooks.has_run()
    }

    fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

/// The outcome of walking the tree: matched path and what is left over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Root first, matched node last.
    pub path: Vec<CommandId>,
    pub remaining: Vec<String>,
}

impl Resolution {
    /// The deepest matched node.
    pub fn target(&self) -> CommandId {
        self.path.last().copied().unwrap_or(CommandId(0))
    }
}

/// An immutable arena of commands.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<Node>,
}

impl CommandTree {
    /// Freeze `root` and everything beneath it, validating the whole tree.
    pub fn build(root: Command) -> Result<Self, BuildError> {
        let mut tree = CommandTree { nodes: Vec::new() };
        tree.insert(root, None);
        tree.validate()?;
        Ok(tree)
    }

    fn insert(&mut self, command: Command, parent: Option<CommandId>) -> CommandId {
        let id = CommandId(self.nodes.len());
        let Command {
            name,
            aliases,
            about,
            long_about,
            flags,
            args,
            children,
            hooks,
        } = command;

        self.nodes.push(Node {
            name,
            aliases,
            about,
            long_about,
            flags,
            args,
            parent,
            children: Vec::new(),
            hooks,
        });

        for child in children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> CommandId {
        CommandId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: CommandId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: CommandId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn hooks_mut(&mut self, id: CommandId) -> &mut Hooks {
        &mut self.nodes[id.0].hooks
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in declaration order, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = (CommandId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (CommandId(i), n))
    }

    /// Root first, `id` last.
    pub fn path(&self, id: CommandId) -> Vec<CommandId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Names below the root, e.g. `["db", "migrate"]`.
    pub fn path_names(&self, id: CommandId) -> Vec<String> {
        self.path(id)
            .into_iter()
            .skip(1)
            .map(|i| self.node(i).name.clone())
            .collect()
    }

    /// Full display path including the root, e.g. `"app db migrate"`.
    pub fn display_path(&self, id: CommandId) -> String {
        self.path(id)
            .into_iter()
            .map(|i| self.node(i).name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Look a command up by canonical names below the root.
    pub fn find<S: AsRef<str>>(&self, names: &[S]) -> Option<CommandId> {
        let mut current = self.root();
        for name in names {
            current = self.child_named(current, name.as_ref())?;
        }
        Some(current)
    }

    fn child_named(&self, id: CommandId, token: &str) -> Option<CommandId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).answers_to(token))
    }

    /// Walk from the root consuming exact name or alias matches; stop at the
    /// first token that matches no child.
    pub fn walk(&self, tokens: &[String]) -> Resolution {
        let mut path = vec![self.root()];
        let mut consumed = 0;
        for token in tokens {
            let current = path[path.len() - 1];
            match self.child_named(current, token) {
                Some(child) => {
                    path.push(child);
                    consumed += 1;
                }
                None => break,
            }
        }
        trace!(matched = consumed, "walked command tree");
        Resolution {
            path,
            remaining: tokens[consumed..].to_vec(),
        }
    }

    /// [`walk`](Self::walk), then refuse to stop on a router.
    pub fn resolve(&self, tokens: &[String]) -> Result<Resolution, UsageError> {
        let resolution = self.walk(tokens);
        let target = resolution.target();
        let node = self.node(target);
        if !node.is_router() {
            return Ok(resolution);
        }

        let path = self.display_path(target);
        match resolution.remaining.first() {
            Some(token) if !is_flag_like(token) => Err(UsageError::UnknownCommand {
                path,
                token: token.clone(),
            }),
            _ => Err(UsageError::CommandRequired {
                path,
                available: node
                    .children
                    .iter()
                    .map(|&c| self.node(c).name.clone())
                    .collect(),
            }),
        }
    }

    /// Flags visible at `id`: root first, descendants shadowing ancestors by
    /// name. A shadowing flag takes the position of the one it replaces.
    pub fn merged_flags(&self, id: CommandId) -> Vec<&Flag> {
        let mut merged: Vec<&Flag> = Vec::new();
        for node_id in self.path(id) {
            for flag in &self.node(node_id).flags {
                match merged.iter().position(|f| f.name() == flag.name()) {
                    Some(pos) => merged[pos] = flag,
                    None => merged.push(flag),
                }
            }
        }
        merged
    }

    fn validate(&self) -> Result<(), BuildError> {
        for (id, node) in self.iter() {
            let command = self.display_path(id);
            validate_names(node)?;
            validate_children(self, node)?;
            if node.is_router() && node.children.is_empty() {
                return Err(BuildError::EmptyRouter(command));
            }
            validate_args(&command, node)?;
            validate_flags(&command, node)?;
            validate_merged(&command, &self.merged_flags(id))?;
        }
        Ok(())
    }
}

fn is_flag_like(token: &str) -> bool {
    token.starts_with('-') && token != "-"
}

fn valid_command_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.chars().any(char::is_whitespace)
}

fn validate_names(node: &Node) -> Result<(), BuildError> {
    for name in std::iter::once(&node.name).chain(&node.aliases) {
        if !valid_command_name(name) {
            return Err(BuildError::InvalidCommandName(name.clone()));
        }
    }
    Ok(())
}

fn validate_children(tree: &CommandTree, node: &Node) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for &child in &node.children {
        let child = tree.node(child);
        for name in std::iter::once(&child.name).chain(&child.aliases) {
            if !seen.insert(name.as_str()) {
                return Err(BuildError::DuplicateCommand {
                    parent: node.name.clone(),
                    name: name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_args(command: &str, node: &Node) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    let mut saw_optional = false;
    for arg in &node.args {
        if !seen.insert(arg.name()) {
            return Err(BuildError::DuplicateArgument {
                command: command.to_string(),
                argument: arg.name().to_string(),
            });
        }
        if arg.is_required() && saw_optional {
            return Err(BuildError::RequiredAfterOptional {
                command: command.to_string(),
                argument: arg.name().to_string(),
            });
        }
        saw_optional |= !arg.is_required();
    }
    Ok(())
}

fn validate_flags(command: &str, node: &Node) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for flag in &node.flags {
        let name = flag.name();
        if name.is_empty()
            || name.starts_with('-')
            || name.contains('=')
            || name.chars().any(char::is_whitespace)
        {
            return Err(BuildError::InvalidFlagName {
                command: command.to_string(),
                flag: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(BuildError::DuplicateFlag {
                command: command.to_string(),
                flag: name.to_string(),
            });
        }
        if let Some(short) = flag.short_name() {
            if !short.is_ascii_alphabetic() {
                return Err(BuildError::InvalidShort {
                    command: command.to_string(),
                    flag: name.to_string(),
                    short,
                });
            }
        }
        if let Some(literal) = flag.default_literal() {
            if flag.is_required() {
                return Err(BuildError::RequiredWithDefault {
                    command: command.to_string(),
                    flag: name.to_string(),
                });
            }
            if flag.kind().parse(literal).is_none() {
                return Err(BuildError::InvalidDefault {
                    command: command.to_string(),
                    flag: name.to_string(),
                    literal: literal.to_string(),
                    kind: flag.kind(),
                });
            }
        }
    }
    Ok(())
}

fn validate_merged(command: &str, flags: &[&Flag]) -> Result<(), BuildError> {
    let mut shorts: HashMap<char, &str> = HashMap::new();
    let mut destinations = HashSet::new();
    for flag in flags {
        if let Some(short) = flag.short_name() {
            if let Some(first) = shorts.insert(short, flag.name()) {
                return Err(BuildError::DuplicateShort {
                    command: command.to_string(),
                    short,
                    first: first.to_string(),
                    second: flag.name().to_string(),
                });
            }
        }
        if !destinations.insert(flag.destination()) {
            return Err(BuildError::DuplicateDestination {
                command: command.to_string(),
                destination: flag.destination().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: &Context, _: &mut Io<'_>) -> HandlerResult {
        Ok(Output::Silent)
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> CommandTree {
        CommandTree::build(
            Command::new("app")
                .flag(Flag::boolean("verbose").short('v'))
                .subcommand(Command::new("greet").alias("hello").run(ok))
                .subcommand(
                    Command::new("db")
                        .flag(Flag::string("url"))
                        .subcommand(Command::new("migrate").alias("m").run(ok))
                        .subcommand(Command::new("seed").run(ok)),
                ),
        )
        .unwrap()
    }

    #[test]
    fn alias_resolves_to_node_with_nothing_left() {
        let tree = sample();
        let resolution = tree.resolve(&tokens(&["hello"])).unwrap();
        assert_eq!(tree.node(resolution.target()).name(), "greet");
        assert!(resolution.remaining.is_empty());
    }

    #[test]
    fn walk_stops_at_first_non_matching_token() {
        let tree = sample();
        let resolution = tree.resolve(&tokens(&["db", "m", "seed", "--force"])).unwrap();
        assert_eq!(tree.path_names(resolution.target()), ["db", "migrate"]);
        assert_eq!(resolution.remaining, tokens(&["seed", "--force"]));
        assert_eq!(resolution.path.len(), 3);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let tree = sample();
        let err = tree.resolve(&tokens(&["Greet"])).unwrap_err();
        assert_eq!(
            err,
            UsageError::UnknownCommand {
                path: "app".into(),
                token: "Greet".into()
            }
        );
    }

    #[test]
    fn router_without_match_requires_a_command() {
        let tree = sample();
        let err = tree.resolve(&tokens(&["db"])).unwrap_err();
        assert_eq!(
            err,
            UsageError::CommandRequired {
                path: "app db".into(),
                available: vec!["migrate".into(), "seed".into()],
            }
        );

        let err = tree.resolve(&tokens(&["db", "--url", "x"])).unwrap_err();
        assert!(matches!(err, UsageError::CommandRequired { .. }));
    }

    #[test]
    fn resolve_is_deterministic() {
        let tree = sample();
        let input = tokens(&["db", "migrate", "extra"]);
        assert_eq!(tree.resolve(&input).unwrap(), tree.resolve(&input).unwrap());
    }

    #[test]
    fn merged_flags_shadow_by_name() {
        let tree = CommandTree::build(
            Command::new("app")
                .flag(Flag::string("format").short('f'))
                .flag(Flag::boolean("verbose"))
                .subcommand(
                    Command::new("export")
                        .flag(Flag::integer("format"))
                        .run(ok),
                ),
        )
        .unwrap();
        let export = tree.find(&["export"]).unwrap();
        let merged = tree.merged_flags(export);
        let names: Vec<&str> = merged.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["format", "verbose"]);
        assert_eq!(merged[0].kind(), crate::FlagKind::Integer);
        assert_eq!(merged[0].short_name(), None);
    }

    #[test]
    fn traversal_for_help() {
        let tree = sample();
        let db = tree.find(&["db"]).unwrap();
        let node = tree.node(db);
        assert!(node.is_router());
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.parent(), Some(tree.root()));
        assert_eq!(tree.display_path(node.children()[0]), "app db migrate");
        assert_eq!(tree.iter().count(), tree.len());
    }

    #[test]
    fn duplicate_sibling_alias_is_rejected() {
        let err = CommandTree::build(
            Command::new("app")
                .subcommand(Command::new("remove").run(ok))
                .subcommand(Command::new("rm").alias("remove").run(ok)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateCommand {
                parent: "app".into(),
                name: "remove".into()
            }
        );
    }

    #[test]
    fn router_without_children_is_rejected() {
        let err = CommandTree::build(Command::new("app").subcommand(Command::new("empty"))).unwrap_err();
        assert_eq!(err, BuildError::EmptyRouter("app empty".into()));
    }

    #[test]
    fn required_after_optional_is_rejected() {
        let err = CommandTree::build(
            Command::new("cp")
                .arg(Arg::optional("src"))
                .arg(Arg::required("dst"))
                .run(ok),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::RequiredAfterOptional { argument, .. } if argument == "dst"));
    }

    #[test]
    fn flag_definition_errors() {
        let build = |flag: Flag| CommandTree::build(Command::new("app").flag(flag).run(ok));

        assert!(matches!(
            build(Flag::integer("port").required().default("80")),
            Err(BuildError::RequiredWithDefault { .. })
        ));
        assert!(matches!(
            build(Flag::integer("port").default("eighty")),
            Err(BuildError::InvalidDefault { .. })
        ));
        assert!(matches!(
            build(Flag::string("name").short('1')),
            Err(BuildError::InvalidShort { short: '1', .. })
        ));
        assert!(matches!(
            build(Flag::string("a=b")),
            Err(BuildError::InvalidFlagName { .. })
        ));
    }

    #[test]
    fn duplicate_short_across_levels_is_rejected() {
        let err = CommandTree::build(
            Command::new("app")
                .flag(Flag::boolean("verbose").short('v'))
                .subcommand(Command::new("show").flag(Flag::boolean("version").short('v')).run(ok)),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateShort { short: 'v', .. }));
    }

    #[test]
    fn duplicate_destination_is_rejected() {
        let err = CommandTree::build(
            Command::new("app")
                .flag(Flag::string("out"))
                .flag(Flag::string("output").dest("out"))
                .run(ok),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateDestination { .. }));
    }
}
