/*!
Reading from files or stdin, writing to files or stdout
*/

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Where CBOR input comes from
#[derive(Debug, Clone)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        match self {
            Input::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            Input::File(path) => fs::read(path),
        }
    }
}

impl core::fmt::Display for Input {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for Input {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Input::Stdin)
        } else {
            Ok(Input::File(PathBuf::from(s)))
        }
    }
}

/// Where results go
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn write_all(&self, data: &[u8]) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(data)?;
                stdout.flush()
            }
            Output::File(path) => fs::write(path, data),
        }
    }

    /// Write text, ending it with a newline on a terminal
    pub fn write_str(&self, data: &str) -> io::Result<()> {
        self.write_all(data.as_bytes())?;
        if matches!(self, Output::Stdout) && !data.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}

impl FromStr for Output {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "-" {
            Ok(Output::Stdout)
        } else {
            Ok(Output::File(PathBuf::from(s)))
        }
    }
}
