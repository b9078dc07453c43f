use crate::infra::InMemoryProfileStore;
use campus_connect::config::DirectoryConfig;
use campus_connect::error::AppError;
use campus_connect::workflows::accounts::{
    Identity, NavigationLog, UserId, UserProfile, UserRole, VisibilitySettings,
};
use campus_connect::workflows::moderation::{DashboardView, TabContent};
use campus_connect::workflows::onboarding::{
    CompletionError, ProfileCompletionFlow, ProfileForm, RoleChoice, SubmitOutcome,
};
use campus_connect::workflows::Portal;
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the overview figures (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Optional JSON array of profiles to load before the walkthrough.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

const DEMO_ADMIN: &str = "demo-admin";

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, seed } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = InMemoryProfileStore::from_config(&DirectoryConfig { seed_path: seed })?;
    store.insert(demo_admin());
    let portal = Portal::new(Arc::new(store));

    println!("Campus Connect onboarding demo");

    println!("\nProfile completion");
    onboard(
        &portal,
        Identity::new("jordan").with_email("jordan.lee@example.edu"),
        ProfileForm {
            display_name: "J".to_string(),
            ..ProfileForm::default()
        },
    )
    .await;
    onboard(
        &portal,
        Identity::new("jordan").with_email("jordan.lee@example.edu"),
        ProfileForm {
            display_name: "Jordan Lee".to_string(),
            role: Some(RoleChoice::Student),
            department: "Physics".to_string(),
            batch: "2027".to_string(),
            ..ProfileForm::default()
        },
    )
    .await;
    onboard(
        &portal,
        Identity::new("priya").with_email("priya.raman@example.edu"),
        ProfileForm {
            display_name: "Priya Raman".to_string(),
            role: Some(RoleChoice::Alumni),
            department: "Computer Science".to_string(),
            batch: "2016".to_string(),
            company: "Orbital Labs".to_string(),
            job_title: "Platform Engineer".to_string(),
            ..ProfileForm::default()
        },
    )
    .await;

    println!("\nModeration");
    let session = match portal.session_for(Some(Identity::new(DEMO_ADMIN))).await {
        Ok(session) => session,
        Err(err) => {
            println!("- admin session unavailable: {err}");
            return Ok(());
        }
    };
    let gate = portal
        .dashboard()
        .mount(&session, &NavigationLog::default())
        .await;
    println!("- admin gate: {gate:?}");
    render_dashboard(&portal.dashboard().view_at(today));

    for pending in portal.dashboard().pending() {
        match portal.dashboard().verify(&pending.uid).await {
            Ok(()) => println!("- approved {} ({})", pending.display_name, pending.uid),
            Err(err) => println!("- could not approve {}: {err}", pending.uid),
        }
    }
    render_dashboard(&portal.dashboard().view_at(today));

    Ok(())
}

async fn onboard(portal: &Portal<InMemoryProfileStore>, identity: Identity, form: ProfileForm) {
    let uid = identity.uid.clone();
    let session = match portal.session_for(Some(identity)).await {
        Ok(session) => Arc::new(session),
        Err(err) => {
            println!("- {uid}: profile lookup failed: {err}");
            return;
        }
    };

    let flow = ProfileCompletionFlow::with_form(session, form);
    let navigation = NavigationLog::default();
    match flow.submit(&navigation).await {
        Ok(SubmitOutcome::Completed {
            profile,
            destination,
        }) => {
            println!(
                "- {} saved as {} (verified: {}) -> {}",
                profile.display_name,
                profile.role.label(),
                profile.is_verified,
                destination.path()
            );
        }
        Ok(SubmitOutcome::Redirected(destination)) => {
            println!("- {uid}: redirected to {}", destination.path())
        }
        Ok(SubmitOutcome::NotReady) => println!("- {uid}: profile still resolving"),
        Err(CompletionError::Invalid(errors)) => {
            println!("- {uid}: form rejected");
            for field in errors.fields() {
                println!(
                    "    {}: {}",
                    field.name(),
                    errors.get(field).unwrap_or_default()
                );
            }
        }
        Err(err) => println!("- {uid}: {err}"),
    }
}

fn render_dashboard(view: &DashboardView) {
    println!("  Pending verifications: {}", view.pending_count);

    if let TabContent::Ready(stats) = &view.overview {
        println!("  Total users: {}", stats.total_users);
        for slice in &stats.distribution {
            println!("    {:<8} {:>3} ({}%)", slice.label, slice.value, slice.percent);
        }
        let growth: Vec<String> = stats
            .growth
            .iter()
            .map(|month| format!("{} {}/{}", month.label, month.students, month.alumni))
            .collect();
        println!("    Sign-ups (students/alumni): {}", growth.join(" | "));
    }

    if let TabContent::Ready(cards) = &view.verification {
        for card in cards {
            println!(
                "    awaiting: {} | {} | {} at {}",
                card.display_name, card.batch, card.job_title, card.company
            );
        }
    }

    if let TabContent::Ready(users) = &view.users {
        for user in users {
            println!(
                "    {:<14} {:<8} {:<9} joined {} {}",
                user.display_name, user.role_label, user.status_label, user.joined_label,
                user.profile_path
            );
        }
    }
}

fn demo_admin() -> UserProfile {
    let now = Utc::now();
    UserProfile {
        uid: UserId::new(DEMO_ADMIN),
        email: "admin@example.edu".to_string(),
        display_name: "Portal Admin".to_string(),
        photo_url: None,
        role: UserRole::Admin,
        is_verified: true,
        department: None,
        batch: None,
        company: None,
        job_title: None,
        bio: None,
        created_at: now,
        updated_at: now,
        visibility_settings: VisibilitySettings::default(),
    }
}
