//! Login, signup and logout commands.

use marketplace_client::Result;
use marketplace_client::views::{
    FormOutcome, LoginForm, Page, SignupForm, submit_login, submit_signup,
};
use secrecy::SecretString;

use super::{Context, listing};
use crate::render;

/// Signup fields as given on the command line.
pub struct SignupArgs {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email: String,
    pub password: String,
}

/// Log in; on success show the first listing page.
pub async fn login(ctx: &Context, email: String, password: String) {
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let outcome = submit_login(&ctx.api, ctx.store.as_ref(), form).await;
    follow(ctx, outcome).await;
}

/// Create an account; on success point at `login`.
pub async fn signup(ctx: &Context, args: SignupArgs) {
    let form = SignupForm {
        first_name: args.first_name,
        last_name: args.last_name,
        full_address: args.address,
        email: args.email,
        password: SecretString::from(args.password),
    };
    let outcome = submit_signup(&ctx.api, form).await;
    follow(ctx, outcome).await;
}

/// Forget the stored session.
pub fn logout(ctx: &Context) -> Result<()> {
    ctx.store.clear()?;
    tracing::info!("Session cleared");
    render::notice("Logged out.");
    Ok(())
}

async fn follow(ctx: &Context, outcome: FormOutcome) {
    match outcome {
        FormOutcome::Navigate { to, flash } => {
            render::flash(&flash);
            if to == Page::Listing {
                listing::show(ctx, 1).await;
            } else {
                render::redirect(to);
            }
        }
        FormOutcome::InlineError(message) => render::inline_error(&message),
    }
}
