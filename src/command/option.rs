use crate::catalog::NodeTypeDescriptor;
use crate::port::{PortSpec, PortType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Output key of every option node.
pub const OPTION_VALUE_KEY: &str = "value";
pub const OPTION_CATEGORY: &str = "Options";
const OPTION_NODE_COLOR: &str = "#427ade";

/// The value type a slash-command option carries.
///
/// Serialized as its integer code (String=0, User=1, Channel=2).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandOptionType {
    #[default]
    String = 0,
    User = 1,
    Channel = 2,
}

impl CommandOptionType {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Unknown codes degrade to `String`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => CommandOptionType::String,
            1 => CommandOptionType::User,
            2 => CommandOptionType::Channel,
            other => {
                warn!(code = other, "Unknown option type, treating as string");
                CommandOptionType::String
            }
        }
    }

    /// The port an option node of this type exposes.
    pub fn port_spec(self) -> PortSpec {
        match self {
            CommandOptionType::String => PortSpec::new(PortType::Text),
            CommandOptionType::User => PortSpec::structure(["user", "user_resolvable"]),
            CommandOptionType::Channel => {
                PortSpec::structure(["channel", "guild_channel", "text_channel"])
            }
        }
    }
}

impl Serialize for CommandOptionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for CommandOptionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = i64::deserialize(deserializer)?;
        Ok(CommandOptionType::from_code(code))
    }
}

/// A parameter of a slash command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub option_type: CommandOptionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, option_type: CommandOptionType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            option_type,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn node_type_id(&self) -> String {
        option_node_type_id(&self.name)
    }

    /// The synthetic catalog entry exposing this option's value to the flow.
    pub fn node_type(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(self.node_type_id(), format!("Get option '{}'", self.name))
            .with_description(self.description.clone())
            .with_category(OPTION_CATEGORY)
            .with_color(OPTION_NODE_COLOR)
            .with_output(OPTION_VALUE_KEY, self.name.clone(), self.option_type.port_spec())
    }
}

/// Catalog id of the synthetic node for the option called `name`.
pub fn option_node_type_id(name: &str) -> String {
    format!("__option_get_{}__", name)
}
