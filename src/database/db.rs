use log::{error, info};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database as MongoDatabase, IndexModel};
use std::error::Error;
use std::time::Duration;

use crate::paper::model::Paper;
use crate::user::model::{PendingUser, User};

pub const USERS: &str = "users";
pub const PENDING_USERS: &str = "pendingusers";
pub const PAPERS: &str = "papers";

/// Pending registrations are reaped by the server this long after creation.
pub const PENDING_USER_TTL: Duration = Duration::from_secs(600);

pub struct Database {
    pub db: MongoDatabase,
}

impl Database {
    pub async fn init(uri: &str, database_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("scholarflow".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client
            .database("admin")
            .run_command(doc! {"ping": 1})
            .await?;

        info!("Connected successfully to MongoDB");

        let db = client.database(database_name);
        Ok(Self { db })
    }

    /// Unique emails, the pending-user TTL reaper and the paper listing index.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.db
            .collection::<User>(USERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;

        let pending = self.db.collection::<PendingUser>(PENDING_USERS);
        pending
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        pending
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "createdAt": 1 })
                    .options(
                        IndexOptions::builder()
                            .expire_after(PENDING_USER_TTL)
                            .build(),
                    )
                    .build(),
            )
            .await?;

        self.db
            .collection::<Paper>(PAPERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user": 1, "createdAt": -1 })
                    .build(),
            )
            .await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }
}

// Convenience wrapper around Database::init() plus index setup
pub async fn connect_to_mongo(uri: &str, database_name: &str) -> Result<Database, Box<dyn Error>> {
    let database = Database::init(uri, database_name).await.map_err(|e| {
        error!("Failed to initialize database: {:?}", e);
        e
    })?;
    database.ensure_indexes().await?;
    Ok(database)
}
