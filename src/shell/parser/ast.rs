use std::path::PathBuf;

/// One side of a line after redirection extraction. `argv` is never empty
/// once it leaves the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Command {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn arguments(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

/// At most two stages. Without a pipe there is no right side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub left: Command,
    pub right: Option<Command>,
}

impl Pipeline {
    pub fn has_pipe(&self) -> bool {
        self.right.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub pipeline: Pipeline,
    pub background: bool,
}
