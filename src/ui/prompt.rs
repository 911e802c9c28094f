// Wed Jan 15 2026 - Alex

use crate::layout::TypeFallback;
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, BufRead, BufReader, Write};

/// Asks the operator about type names nothing else could size.
pub struct InteractivePrompt<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl InteractivePrompt<BufReader<io::Stdin>, io::Stderr> {
    /// Questions go to stderr so annotated output on stdout stays clean.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn ask(&self, question: &str) -> Option<String> {
        {
            let mut output = self.output.lock();
            let _ = write!(output, "{} {}", "[?]".yellow(), question);
            let _ = output.flush();
        }

        let mut line = String::new();
        match self.input.lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn say(&self, line: &str) {
        let _ = writeln!(self.output.lock(), "{}", line);
    }
}

impl<R: BufRead, W: Write> TypeFallback for InteractivePrompt<R, W> {
    fn confirm_pointer(&self, type_name: &str) -> bool {
        let question = format!("Could not size '{}'. Is it a pointer? [y/N] ", type_name);
        matches!(
            self.ask(&question).as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        )
    }

    fn choose_candidate(&self, type_name: &str, candidates: &[String]) -> Option<String> {
        self.say(&format!("{} '{}' matches several types:", "[*]".blue(), type_name));
        for (i, candidate) in candidates.iter().enumerate() {
            self.say(&format!("  {:>2}) {}", i + 1, candidate));
        }

        let answer = self.ask(&format!("Pick 1-{} or type a name (empty skips): ", candidates.len()))?;
        if answer.is_empty() {
            return None;
        }
        if let Ok(choice) = answer.parse::<usize>() {
            return choice.checked_sub(1).and_then(|i| candidates.get(i)).cloned();
        }
        candidates.iter().find(|c| c.eq_ignore_ascii_case(&answer)).cloned()
    }
}
