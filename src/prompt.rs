use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

/// How many times an invalid yes/no answer is re-asked before giving up.
const CONFIRM_RETRIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreachableChoice {
    Continue,
    Different(String),
    Invalid,
}

/// Every question the tool may put to the person running it.
pub trait Operator {
    /// `None` when no target was supplied (empty answer or end of input).
    fn ask_target(&mut self) -> Option<String>;
    fn on_unreachable(&mut self, target: &str) -> UnreachableChoice;
    /// yes/no question; anything other than a clear yes counts as no.
    fn confirm(&mut self, question: &str) -> bool;
}

pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl ConsoleOperator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        ConsoleOperator::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsoleOperator { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{question}");
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = writeln!(self.output);
                None
            }
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn ask_target(&mut self) -> Option<String> {
        self.ask("Enter a URL: ").filter(|t| !t.is_empty())
    }

    fn on_unreachable(&mut self, target: &str) -> UnreachableChoice {
        let question =
            format!("{target} is unreachable. Continue (C) or enter different URL (D)? ");
        match self.ask(&question).map(|a| a.to_lowercase()).as_deref() {
            Some("c") => UnreachableChoice::Continue,
            Some("d") => match self.ask("Enter a different URL: ") {
                Some(url) if !url.is_empty() => UnreachableChoice::Different(url),
                _ => UnreachableChoice::Invalid,
            },
            _ => UnreachableChoice::Invalid,
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        let prompt = format!("{question} (yes/no): ");
        let mut retries_left = CONFIRM_RETRIES;
        loop {
            let Some(answer) = self.ask(&prompt) else {
                return false;
            };
            match answer.to_lowercase().as_str() {
                "yes" | "y" => return true,
                "no" | "n" => return false,
                _ if retries_left == 0 => {
                    self.say("Max attempts reached. Assuming no.");
                    return false;
                }
                _ => {
                    self.say(&format!(
                        "Invalid input. Please enter 'yes', 'no', 'y', or 'n'. Attempts remaining: {retries_left}"
                    ));
                    retries_left -= 1;
                }
            }
        }
    }
}
