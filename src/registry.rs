//! # Synctest: Canonical Command Registry
//!
//! Maps each DSL verb to the single [`Command`] instance that implements it.
//!
//! ## Usage Workflow
//! ```rust
//! use synctest::registry::build_default_command_registry;
//! let registry = build_default_command_registry();
//! assert!(registry.lookup("mkfile").is_some());
//! assert!(registry.lookup("no-such-verb").is_none());
//! ```
//!
//! ## Registry Invariant
//! The registry is constructed once at the entrypoint and shared (by `Arc`) with the
//! parser and the runner. A verb may be registered exactly once; registering a name twice
//! is a programming error and panics.

use crate::commands::{self, Command};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CORE TYPE
// ============================================================================

/// Verb name to handler mapping, safe to share between threads.
///
/// Registration and lookup take the same lock; lookups only clone an `Arc`,
/// so the lock is never held across a command's filesystem work.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Mutex<HashMap<String, Arc<dyn Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cmd` under `cmd.name()`.
    ///
    /// # Panics
    /// If a command with the same name is already registered.
    pub fn register<C: Command + 'static>(&self, cmd: C) {
        self.register_arc(Arc::new(cmd));
    }

    /// Same as [`CommandRegistry::register`] for an already shared handler.
    pub fn register_arc(&self, cmd: Arc<dyn Command>) {
        let mut map = self.commands.lock();
        let name = cmd.name().to_string();
        if map.contains_key(&name) {
            panic!("{}: command already registered", name);
        }
        map.insert(name, cmd);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.lock().get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.lock().contains_key(name)
    }

    /// Registered verbs, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.list())
            .finish()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds a registry holding every built-in fixture command.
///
/// All entrypoints (CLI, library, tests) use this so they agree on the verb set.
#[inline]
pub fn build_default_command_registry() -> CommandRegistry {
    let registry = CommandRegistry::new();
    commands::register_all_commands(&registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::errors::CommandError;
    use crate::runtime::env::TestEnv;

    struct Noop(&'static str);

    impl Command for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn run(&self, _env: &TestEnv, _args: &[String]) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_registry_has_builtin_verbs() {
        let registry = build_default_command_registry();
        for verb in ["mkfile", "rm", "symlink", "sync", "touch", "mutate", "clone"] {
            assert!(registry.has(verb), "missing verb {verb}");
        }
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_lookup_returns_same_instance() {
        let registry = CommandRegistry::new();
        registry.register(Noop("noop"));
        let a = registry.lookup("noop").unwrap();
        let b = registry.lookup("noop").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    #[should_panic(expected = "noop: command already registered")]
    fn test_duplicate_registration_panics() {
        let registry = CommandRegistry::new();
        registry.register(Noop("noop"));
        registry.register(Noop("noop"));
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = CommandRegistry::new();
        let names: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f", "g", "h"];
        std::thread::scope(|s| {
            for &n in &names {
                let registry = &registry;
                s.spawn(move || registry.register(Noop(n)));
            }
        });
        assert_eq!(registry.list(), names);
    }
}
