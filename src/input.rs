use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal, Read};
use zeroize::Zeroizing;

pub const SECRET_ENV: &str = "KEYWARD_SECRET";

/// Reads the secret to hash or verify.
///
/// Sources, in order: the `KEYWARD_SECRET` variable, one line of piped
/// stdin, an interactive prompt. With `confirm` the prompt asks twice.
pub fn read_secret(confirm: bool) -> Result<Zeroizing<String>> {
    //  KEYWARD_SECRET="hunter2" keyward hash
    if let Ok(secret) = std::env::var(SECRET_ENV) {
        if !secret.is_empty() {
            return Ok(Zeroizing::new(secret));
        }
    }

    //  printf "%s" "$PW" | keyward hash
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if buf.is_empty() {
            bail!("secret cannot be empty");
        }
        return Ok(buf);
    }

    let first = Zeroizing::new(rpassword::prompt_password("Secret: ")?);
    if first.is_empty() {
        bail!("secret cannot be empty");
    }

    if confirm {
        let second = Zeroizing::new(rpassword::prompt_password("Confirm secret: ")?);
        if first != second {
            bail!("secrets do not match");
        }
    }

    Ok(first)
}

/// Reads stdin to the end.
pub fn read_stdin() -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::new());
    io::stdin().lock().read_to_end(&mut buf)?;
    Ok(buf)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
