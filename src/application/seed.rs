//! Sample data for local runs.

use thiserror::Error;
use tracing::info;

use crate::application::items::{CreateItemCommand, ItemError, ItemService};
use crate::application::pagination::PageRequest;
use crate::application::repos::{CreateUserParams, RepoError, UsersRepo, UsersWriteRepo};
use crate::domain::types::Authority;

const SAMPLE_ITEM_NAME: &str = "TestItem1";
const SAMPLE_ITEM_DESCRIPTION: &str = "Description for first item";
const SAMPLE_LAST_NAME: &str = "Calories";
const SAMPLE_EMAIL_DOMAIN: &str = "test.com";

struct SampleUser {
    first_name: &'static str,
    authority: Authority,
    locked: bool,
}

const SAMPLE_USERS: [SampleUser; 6] = [
    SampleUser {
        first_name: "una",
        authority: Authority::User,
        locked: false,
    },
    SampleUser {
        first_name: "theon",
        authority: Authority::User,
        locked: false,
    },
    SampleUser {
        first_name: "frank",
        authority: Authority::User,
        locked: false,
    },
    SampleUser {
        first_name: "luka",
        authority: Authority::User,
        locked: true,
    },
    SampleUser {
        first_name: "mark",
        authority: Authority::UserManager,
        locked: false,
    },
    SampleUser {
        first_name: "andrew",
        authority: Authority::Admin,
        locked: false,
    },
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Items(#[from] ItemError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub items_created: usize,
    pub users_created: usize,
}

/// Inserts the sample item when the store is empty and every sample user whose email is
/// not taken yet. Safe to run on every start.
pub async fn seed_sample_data(
    items: &ItemService,
    users_reader: &dyn UsersRepo,
    users_writer: &dyn UsersWriteRepo,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let existing = items.find_all(&PageRequest::new(0, 1, None)).await?;
    if existing.total_elements == 0 {
        items
            .create(CreateItemCommand {
                name: Some(SAMPLE_ITEM_NAME.to_string()),
                description: Some(SAMPLE_ITEM_DESCRIPTION.to_string()),
            })
            .await?;
        report.items_created += 1;
    }

    for sample in &SAMPLE_USERS {
        let email = format!("{}@{SAMPLE_EMAIL_DOMAIN}", sample.first_name);
        if users_reader.find_user_by_email(&email).await?.is_some() {
            continue;
        }
        users_writer
            .create_user(CreateUserParams {
                email,
                first_name: sample.first_name.to_string(),
                last_name: SAMPLE_LAST_NAME.to_string(),
                enabled: true,
                locked: sample.locked,
                authorities: vec![sample.authority],
            })
            .await?;
        report.users_created += 1;
    }

    info!(
        target = "application::seed",
        items_created = report.items_created,
        users_created = report.users_created,
        "sample data seeded"
    );
    Ok(report)
}
