//! Login and logout

use tracing::info;

use super::Context;
use crate::errors::Result;
use crate::output::{print_info, print_success};
use crate::session::Session;

pub async fn login(ctx: &mut Context, username: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt(format!("Password for {username}"))
            .interact()?,
    };

    let response = ctx.api.login(&username, &password).await?;
    let session = Session::authenticated(response.access_token, Some(username.clone()));
    ctx.store.save(&session).await?;
    ctx.api.set_session(session);

    info!("Logged in as {username}");
    print_success(&format!("Logged in as {username}"));
    Ok(())
}

pub async fn logout(ctx: &mut Context) -> Result<()> {
    if !ctx.is_authenticated() {
        print_info("Not logged in");
        return Ok(());
    }
    ctx.store.clear().await?;
    ctx.api.set_session(Session::anonymous());
    print_success("Logged out");
    Ok(())
}
