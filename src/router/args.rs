/// Command-line tokens split into positionals and named options.
///
/// Option names are stored without leading dashes. A bare flag binds `"true"`;
/// `--name value` is not recognised, use `--name=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    positionals: Vec<String>,
    options: Vec<(String, String)>,
}

impl CommandArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split raw tokens.
    ///
    /// - `--name=value` and `--name` (flag)
    /// - `-x`, `-x=value`, and clusters `-xy` expanding to `-x -y`
    /// - `--` ends option parsing; `-` and negative numbers are positionals
    pub fn parse<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut args = Self::new();
        let mut options_done = false;
        for token in tokens {
            let token = token.as_ref();
            if options_done {
                args.positionals.push(token.to_string());
                continue;
            }
            if token == "--" {
                options_done = true;
            } else if let Some(long) = token.strip_prefix("--") {
                match long.split_once('=') {
                    Some((name, value)) => args.push_option(name, value),
                    None => args.push_option(long, "true"),
                }
            } else if let Some(short) = token.strip_prefix('-').filter(|s| is_short(s)) {
                match short.split_once('=') {
                    Some((name, value)) => args.push_option(name, value),
                    None => {
                        for c in short.chars() {
                            args.options.push((c.to_string(), "true".to_string()));
                        }
                    }
                }
            } else {
                args.positionals.push(token.to_string());
            }
        }
        args
    }

    /// Append a positional token
    #[must_use]
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.positionals.push(value.into());
        self
    }

    /// Append a named option
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    fn push_option(&mut self, name: &str, value: &str) {
        self.options.push((name.to_string(), value.to_string()));
    }

    #[must_use]
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Options in the order given, repeated names included
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every value given for any of `names`, in order
    pub fn values_of<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        self.options
            .iter()
            .filter(move |(k, _)| names.contains(&k.as_str()))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty() && self.options.is_empty()
    }
}

fn is_short(body: &str) -> bool {
    let name = body.split_once('=').map_or(body, |(name, _)| name);
    !name.is_empty() && body.parse::<f64>().is_err()
}
