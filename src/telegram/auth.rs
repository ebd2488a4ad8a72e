use std::io::{self, IsTerminal, Write};

use grammers_client::{Client, SignInError};

use super::error::TelegramError;
use super::session::SessionStore;

/// Make sure `client` is logged in, running the interactive login flow if not.
///
/// 1. Returns immediately if the stored session is already authorized.
/// 2. Refuses to prompt when stdin is not a terminal.
/// 3. Requests a login code for the phone number (configured or prompted).
/// 4. Signs in with the code, asking for the 2FA password when required.
/// 5. Saves the session so the next run skips all of the above.
pub async fn ensure_authorized(
    client: &Client,
    phone: Option<&str>,
    store: &SessionStore,
) -> Result<(), TelegramError> {
    if client
        .is_authorized()
        .await
        .map_err(TelegramError::invocation)?
    {
        tracing::debug!("Existing session is authorized");
        return Ok(());
    }

    if !io::stdin().is_terminal() {
        return Err(TelegramError::Headless);
    }

    tracing::info!("Session is not authorized, signing in");

    let phone = match phone {
        Some(p) => p.to_string(),
        None => prompt_line("Enter your phone number (international format): ").await?,
    };
    let phone = normalize_phone(&phone);
    if phone.is_empty() {
        return Err(TelegramError::SignIn("phone number is empty".into()));
    }

    let token = client
        .request_login_code(&phone)
        .await
        .map_err(|e| TelegramError::SignIn(e.to_string()))?;

    let code = prompt_line("Enter the login code Telegram sent you: ").await?;

    match client.sign_in(&token, &code).await {
        Ok(_) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token.hint().unwrap_or("none").to_string();
            let password = prompt_password(format!("2FA password (hint: {}): ", hint)).await?;
            client
                .check_password(password_token, password.trim())
                .await
                .map_err(|e| TelegramError::SignIn(e.to_string()))?;
        }
        Err(SignInError::InvalidCode) => {
            return Err(TelegramError::SignIn("the login code was not accepted".into()));
        }
        Err(e) => return Err(TelegramError::SignIn(e.to_string())),
    }

    store.save(client)?;
    tracing::info!("Signed in successfully");
    Ok(())
}

/// Keep the leading `+` and digits only; users paste numbers with spaces,
/// dashes and parentheses.
fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        if c.is_ascii_digit() || (i == 0 && c == '+') {
            out.push(c);
        }
    }
    out
}

async fn prompt_line(prompt: &'static str) -> Result<String, TelegramError> {
    let line = tokio::task::spawn_blocking(move || {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok::<String, io::Error>(line.trim().to_string())
    })
    .await
    .map_err(io::Error::other)??;
    Ok(line)
}

async fn prompt_password(prompt: String) -> Result<String, TelegramError> {
    let password = tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
        .await
        .map_err(io::Error::other)??;
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(normalize_phone("  447700900123 "), "447700900123");
        assert_eq!(normalize_phone("12+34"), "1234");
        assert_eq!(normalize_phone(""), "");
    }
}
