//! Database export, import and environment-to-environment transfer

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command::naming::{database_container, namespace};
use crate::command::runner::with_task_runner;
use crate::command::{database, files};
use crate::exec::LogStream;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::models::environment::{CloudEnvironment, Environment, Project};
use crate::models::message::Message;
use crate::sync::SyncMatrix;
use crate::utils::epoch_millis;

/// `<project>.<environment>.<millis>.sql.gz`
pub fn dump_name(project: &Project, environment: &Environment, millis: i64) -> String {
    format!(
        "{}.{}.{}.sql.gz",
        project.machine_name,
        environment.machine_name(),
        millis
    )
}

/// `<dir>/<file name of source>`, as seen by a POSIX target
fn staged_path(dir: &str, source: &Path) -> String {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

impl SyncMatrix {
    /// Export the database of `environment` as a gzip dump into `export_dir`
    ///
    /// On success `data` holds the local dump path.
    pub async fn export_database(
        &self,
        project: &Project,
        environment: &Environment,
        export_dir: &Path,
        stream: &LogStream,
    ) -> Message {
        let dump_path = export_dir.join(dump_name(project, environment, epoch_millis()));
        info!("Exporting database of {} to {}", environment.machine_name(), dump_path.display());

        if let Err(e) = Dir::new(export_dir).create().await {
            return Message::failure(format!(
                "Unable to create {}: {}",
                export_dir.display(),
                e
            ));
        }

        let result = match environment {
            Environment::Desktop(_) => {
                let command = database::export_desktop(
                    &self.settings.runtime.container_program,
                    &self.settings.database,
                    &namespace(project, environment),
                    &dump_path,
                );
                self.executor.run_local(&command, None, stream).await
            }
            Environment::Cloud(cloud) => self.export_cloud(cloud, &dump_path, stream).await,
        };

        if !result.is_success() {
            warn!("Database export of {} failed", environment.machine_name());
            let partial = File::new(&dump_path);
            if partial.exists().await {
                if let Err(e) = partial.delete().await {
                    warn!("Unable to remove partial dump {}: {}", dump_path.display(), e);
                }
            }
            return result;
        }

        let path = dump_path.to_string_lossy().into_owned();
        Message::success(format!("Database dump exported at {}", path)).with_data(path)
    }

    /// Dump on the host, download, then remove the remote copy
    async fn export_cloud(&self, cloud: &CloudEnvironment, dump_path: &Path, stream: &LogStream) -> Message {
        let remote_path = staged_path(&self.settings.sync.cloud_tmp, dump_path);

        let dumped = self
            .executor
            .run_remote(
                &with_task_runner(cloud, &database::export_cloud(&remote_path)),
                cloud,
                stream,
            )
            .await;
        if !dumped.is_success() {
            return dumped;
        }

        let fetched = self.executor.fetch_file(cloud, &remote_path, dump_path).await;
        self.remove_remote(cloud, &remote_path, stream).await;
        fetched
    }

    /// Import the dump at `source` into the database of `environment`
    pub async fn import_database(
        &self,
        project: &Project,
        environment: &Environment,
        source: &Path,
        stream: &LogStream,
    ) -> Message {
        info!("Importing {} into {}", source.display(), environment.machine_name());

        if !File::new(source).exists().await {
            return Message::failure(format!("{} does not exist", source.display()));
        }

        let result = match environment {
            Environment::Desktop(_) => self.import_desktop(project, environment, source, stream).await,
            Environment::Cloud(cloud) => self.import_cloud(cloud, source, stream).await,
        };

        if !result.is_success() {
            warn!("Database import into {} failed", environment.machine_name());
            return result;
        }

        Message::success(format!(
            "Database dump {} imported into {}",
            source.display(),
            environment.machine_name()
        ))
    }

    /// Copy into the database container, load, then remove the copy
    async fn import_desktop(
        &self,
        project: &Project,
        environment: &Environment,
        source: &Path,
        stream: &LogStream,
    ) -> Message {
        let program = &self.settings.runtime.container_program;
        let ns = namespace(project, environment);
        let container = database_container(&ns);
        let staged = staged_path(&self.settings.sync.desktop_tmp, source);

        let copied = self
            .executor
            .run_local(
                &files::copy_into_container(program, source, &container, &staged),
                None,
                stream,
            )
            .await;
        if !copied.is_success() {
            return copied;
        }

        let imported = self
            .executor
            .run_local(
                &database::import_desktop(program, &self.settings.database, &ns, source, &staged),
                None,
                stream,
            )
            .await;

        let removed = self
            .executor
            .run_local(&files::remove_in_container(program, &container, &staged), None, stream)
            .await;
        if !removed.is_success() {
            warn!("Unable to remove {} from {}", staged, container);
        }

        imported
    }

    /// Upload to the host, load, then remove the upload
    async fn import_cloud(&self, cloud: &CloudEnvironment, source: &Path, stream: &LogStream) -> Message {
        let remote_path = staged_path(&self.settings.sync.cloud_tmp, source);

        let pushed = self.executor.push_file(cloud, source, &remote_path).await;
        if !pushed.is_success() {
            return pushed;
        }

        let imported = self
            .executor
            .run_remote(
                &with_task_runner(cloud, &database::import_cloud(source, &remote_path)),
                cloud,
                stream,
            )
            .await;

        self.remove_remote(cloud, &remote_path, stream).await;
        imported
    }

    async fn remove_remote(&self, cloud: &CloudEnvironment, remote_path: &str, stream: &LogStream) {
        let removed = self
            .executor
            .run_remote(&files::remove_remote(remote_path), cloud, stream)
            .await;
        if !removed.is_success() {
            warn!("Unable to remove {} on {}", remote_path, cloud.host);
        }
    }

    /// Replace the database of `destination` with the one of `source`
    ///
    /// The dump is staged locally and deleted afterwards.
    pub async fn sync_database(
        &self,
        project: &Project,
        destination: &Environment,
        source: &Environment,
        stream: &LogStream,
    ) -> Message {
        let exported = self
            .export_database(project, source, self.staging.path(), stream)
            .await;
        let Some(dump) = exported.data().map(PathBuf::from) else {
            return exported;
        };

        let imported = self.import_database(project, destination, &dump, stream).await;

        if let Err(e) = File::new(&dump).delete().await {
            warn!("Unable to delete staged dump {}: {}", dump.display(), e);
        } else {
            debug!("Deleted staged dump {}", dump.display());
        }

        if !imported.is_success() {
            return imported;
        }

        Message::success(format!(
            "Database synchronized from {} to {}",
            source.machine_name(),
            destination.machine_name()
        ))
    }
}
