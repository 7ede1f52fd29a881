use clap::Subcommand;
use std::io::{BufRead, IsTerminal, Write};
use voketag_client::jwt::{is_jwt_valid, role_from_jwt, subject};
use voketag_core::{Error, Result};

use crate::context::Context;
use crate::output::{field, or_dash, print_json};

#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in to the admin service and store the session
    Login {
        email: String,

        /// Read the password from the first line of stdin without prompting
        #[arg(long)]
        password_stdin: bool,

        #[arg(long, env = "VOKETAG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who the stored session belongs to
    Whoami,
}

impl AuthCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let auth = &ctx.clients.auth;
        match self {
            AuthCommands::Login {
                email,
                password_stdin,
                password,
            } => {
                let password = match password {
                    Some(password) if !password_stdin => password,
                    _ => read_password(!password_stdin)?,
                };
                let login = auth.login(&email, &password).await?;
                let session = auth.session()?;
                println!(
                    "Logado como {} ({})",
                    session.email.as_deref().unwrap_or(&email),
                    session
                        .role
                        .unwrap_or_else(|| role_from_jwt(&login.access_token))
                );
                Ok(())
            }
            AuthCommands::Logout => {
                auth.logout()?;
                println!("Sessão encerrada");
                Ok(())
            }
            AuthCommands::Whoami => {
                let session = auth.session()?;
                let Some(token) = session.access_token.as_deref() else {
                    return Err(Error::unauthorized("Não autenticado"));
                };
                let now = chrono::Utc::now().timestamp();
                let valid = is_jwt_valid(token, now);
                let role = session.role.unwrap_or_else(|| role_from_jwt(token));
                let who = session.email.clone().or_else(|| subject(token));
                if ctx.json {
                    return print_json(&serde_json::json!({
                        "email": who,
                        "role": role,
                        "token_valid": valid,
                        "can_refresh": session.refresh_token.is_some(),
                    }));
                }
                field("Usuário", or_dash(who.as_deref()));
                field("Perfil", role);
                field("Token válido", valid);
                field("Refresh", session.refresh_token.is_some());
                Ok(())
            }
        }
    }
}

/// One line from stdin, prompting on stderr when it is a terminal
fn read_password(prompt: bool) -> Result<String> {
    let stdin = std::io::stdin();
    if prompt && stdin.is_terminal() {
        eprint!("Senha: ");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(Error::validation("password", "senha vazia"));
    }
    Ok(password)
}
