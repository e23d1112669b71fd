use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::path::PathBuf;

/// Whether `cd`/`exit` are recognised when the line also contains a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScope {
    /// The first word of the line decides, pipe or not.
    Always,
    /// Only a pipe-free line can be a built-in.
    SingleCommand,
}

impl BuiltinScope {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "always" => Some(BuiltinScope::Always),
            "single" | "single-command" => Some(BuiltinScope::SingleCommand),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub home_dir: Option<PathBuf>,
    pub theme: String,
    pub editor_mode: String,
    pub builtin_scope: BuiltinScope,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub log_to_stderr: bool,
}

impl Config {
    fn get_config_dir(home_dir: Option<&PathBuf>) -> PathBuf {
        match home_dir {
            Some(home) => home.join(".config/mysh"),
            None => PathBuf::from("/tmp/mysh"),
        }
    }

    fn default() -> Self {
        let home_dir = env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);
        let config_dir = Self::get_config_dir(home_dir.as_ref());
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            home_dir,
            theme: String::from("default"),
            editor_mode: String::from("emacs"),
            builtin_scope: BuiltinScope::Always,
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            log_to_stderr: false,
        }
    }

    pub fn new() -> Self {
        // .env values only fill in what the real environment leaves unset
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply(|key| env::var(key).ok());
        config
    }

    fn apply(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(theme) = lookup("MYSH_THEME") {
            self.theme = theme;
        }

        if let Some(editor) = lookup("MYSH_EDITOR") {
            self.editor_mode = editor;
        }

        if let Some(scope) = lookup("MYSH_BUILTIN_SCOPE") {
            match BuiltinScope::parse(&scope) {
                Some(scope) => self.builtin_scope = scope,
                None => eprintln!("mysh: unknown MYSH_BUILTIN_SCOPE {:?}, using always", scope),
            }
        }

        if let Some(level) = lookup("MYSH_LOG_LEVEL") {
            self.logger_level = level;
        }

        if let Some(dir) = lookup("MYSH_LOG_DIR") {
            self.logger_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup("MYSH_LOG_STDERR") {
            self.log_to_stderr = matches!(
                flag.trim().to_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
