//! Plugin bridge
//!
//! Optional adapter for selector-style callers that address widgets by name
//! and invoke methods by string. Method names are parsed into each widget's
//! closed command enum; nothing is looked up reflectively.

use std::collections::BTreeSet;
use std::str::FromStr;

use fos_dom::NodeId;

use crate::component::Component;
use crate::config::Config;
use crate::registry::ComponentKind;
use crate::widgets::{Alert, Button, Carousel, Collapse, Dropdown, Modal, Offcanvas, Popover, Tab, Toast, Tooltip};
use crate::{Runtime, WidgetError};

/// Declare a widget's string-addressable methods
#[macro_export]
macro_rules! plugin_commands {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $method:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name callers use to invoke the command
            pub fn method_name(self) -> &'static str {
                match self {
                    $($name::$variant => $method),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                match s {
                    $($method => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

/// Widget reachable through the bridge
pub trait Plugin: Component {
    type Command: FromStr + Copy;

    /// Options used when a method call has to create the instance
    fn command_config(_command: Self::Command) -> Config {
        Config::new()
    }

    fn execute(&self, rt: &mut Runtime, command: Self::Command);
}

/// What a bridge call asks for
#[derive(Debug, Clone, PartialEq)]
pub enum PluginCall<'a> {
    /// Create (or fetch) the instance with these options
    Config(Config),
    /// Invoke a named method on the instance
    Method(&'a str),
}

/// Parse a method name, rejecting private and constructor names
pub fn parse_command<P: Plugin>(method: &str) -> Result<P::Command, WidgetError> {
    let unknown = || WidgetError::UnknownMethod {
        component: P::KIND.name(),
        method: method.to_string(),
    };
    if method.starts_with('_') || method == "constructor" {
        return Err(unknown());
    }
    method.parse().map_err(|_| unknown())
}

fn invoke<P: Plugin>(rt: &mut Runtime, element: NodeId, call: PluginCall<'_>) -> Result<(), WidgetError> {
    match call {
        PluginCall::Config(config) => {
            P::get_or_create_instance(rt, element, config)?;
        }
        PluginCall::Method(method) => {
            let command = parse_command::<P>(method)?;
            let instance = P::get_or_create_instance(rt, element, P::command_config(command))?;
            instance.execute(rt, command);
        }
    }
    Ok(())
}

/// Names registered with the bridge
#[derive(Debug, Default)]
pub struct PluginBridge {
    registered: BTreeSet<ComponentKind>,
}

impl PluginBridge {
    pub fn is_registered(&self, name: &str) -> bool {
        ComponentKind::from_name(name).is_some_and(|k| self.registered.contains(&k))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.registered.iter().map(|k| k.name()).collect()
    }
}

impl Runtime {
    /// Register every widget name with the bridge
    pub fn install_plugin_bridge(&mut self) {
        let bridge = self.bridge.get_or_insert_with(PluginBridge::default);
        for kind in ComponentKind::ALL {
            if bridge.registered.insert(kind) {
                tracing::debug!("plugin bridge: registered {kind}");
            }
        }
    }

    pub fn plugin_bridge(&self) -> Option<&PluginBridge> {
        self.bridge.as_ref()
    }

    /// Call a widget by name on each element, the way a selector-based
    /// plugin runtime would. Stops at the first error.
    pub fn plugin(&mut self, name: &str, elements: &[NodeId], call: PluginCall<'_>) -> Result<(), WidgetError> {
        let kind = self
            .bridge
            .as_ref()
            .filter(|b| b.is_registered(name))
            .and_then(|_| ComponentKind::from_name(name))
            .ok_or_else(|| WidgetError::UnknownPlugin(name.to_string()))?;

        for &element in elements {
            let call = call.clone();
            match kind {
                ComponentKind::Alert => invoke::<Alert>(self, element, call)?,
                ComponentKind::Button => invoke::<Button>(self, element, call)?,
                ComponentKind::Carousel => invoke::<Carousel>(self, element, call)?,
                ComponentKind::Collapse => invoke::<Collapse>(self, element, call)?,
                ComponentKind::Dropdown => invoke::<Dropdown>(self, element, call)?,
                ComponentKind::Modal => invoke::<Modal>(self, element, call)?,
                ComponentKind::Offcanvas => invoke::<Offcanvas>(self, element, call)?,
                ComponentKind::Popover => invoke::<Popover>(self, element, call)?,
                ComponentKind::Tab => invoke::<Tab>(self, element, call)?,
                ComponentKind::Toast => invoke::<Toast>(self, element, call)?,
                ComponentKind::Tooltip => invoke::<Tooltip>(self, element, call)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::ModalCommand;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command::<Modal>("show"), Ok(ModalCommand::Show));
        assert_eq!(parse_command::<Modal>("handleUpdate"), Ok(ModalCommand::HandleUpdate));
        for bad in ["_showElement", "constructor", "explode"] {
            let err = parse_command::<Modal>(bad).unwrap_err();
            assert_eq!(err.to_string(), format!("No method named \"{bad}\" on modal"));
        }
    }

    #[test]
    fn test_bridge_requires_install() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let err = rt.plugin("alert", &[body], PluginCall::Method("close")).unwrap_err();
        assert_eq!(err, WidgetError::UnknownPlugin(String::from("alert")));

        rt.install_plugin_bridge();
        assert!(rt.plugin_bridge().unwrap().is_registered("toast"));
        assert!(matches!(
            rt.plugin("scrollspy", &[body], PluginCall::Config(Config::new())),
            Err(WidgetError::UnknownPlugin(_))
        ));
    }
}
