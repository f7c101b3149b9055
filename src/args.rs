/// Append-only ordered list of argument fragments.
///
/// Fragment order is the contract: ffmpeg reads `-i` and everything that
/// references it positionally, so nothing here may reorder. The only
/// removal is `remove_matching`, used to derive a condensed preview of the
/// command line.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    fragments: Vec<String>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The command line as displayed to the user.
    pub fn join(&self) -> String {
        self.fragments.join(" ")
    }

    pub fn remove_matching<F>(&mut self, predicate: F)
    where
        F: Fn(&str) -> bool,
    {
        self.fragments.retain(|fragment| !predicate(fragment));
    }

    /// The argv actually handed to `Command`: fragments split on whitespace,
    /// with double quotes grouping (and stripped from) embedded paths and
    /// filter graphs.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for fragment in &self.fragments {
            let mut current = String::new();
            let mut started = false;
            let mut quoted = false;
            for ch in fragment.chars() {
                match ch {
                    '"' => {
                        quoted = !quoted;
                        started = true;
                    }
                    c if c.is_whitespace() && !quoted => {
                        if started {
                            tokens.push(std::mem::take(&mut current));
                            started = false;
                        }
                    }
                    c => {
                        current.push(c);
                        started = true;
                    }
                }
            }
            if started {
                tokens.push(current);
            }
        }
        tokens
    }
}
