use clan_inspector::db;
use clan_inspector::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            if pending.is_empty() {
                println!("Schema is up to date.");
                return Ok(());
            }
            for migration in &pending {
                println!("Applying {}", migration.name());
            }
            Migrator::up(&db, None).await?;
            println!("{} migration(s) applied.", pending.len());
        }
        MigrateAction::Down => {
            println!("Rolling back last migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!("Dropping the clan tables and rebuilding the schema...");
            Migrator::fresh(&db).await?;
            println!("Schema rebuilt; run `clan-inspector roster` to repopulate.");
        }
    }

    Ok(())
}
