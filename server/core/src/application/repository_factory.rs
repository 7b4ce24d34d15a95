// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory
//!
//! Picks the store driver and the matching repository implementations for the
//! configured backend. The PostgreSQL repositories share the driver's pool, so
//! they only work once the connection supervisor has connected the driver.

use std::sync::Arc;

use crate::domain::config::{BackendKind, DatabaseConfig};
use crate::domain::repository::{
    AnnouncementRepository, AttendanceRepository, ExamResultRepository, FeeRepository,
    HomeworkRepository, ReportRepository, StorageBackend, UserRepository,
};
use crate::domain::store::StoreDriver;
use crate::infrastructure::db::PostgresDriver;
use crate::infrastructure::memory_driver::InMemoryDriver;
use crate::infrastructure::repositories::postgres::{
    PostgresAnnouncementRepository, PostgresAttendanceRepository, PostgresExamResultRepository,
    PostgresFeeRepository, PostgresHomeworkRepository, PostgresReportRepository,
    PostgresUserRepository,
};
use crate::infrastructure::repositories::{
    InMemoryAnnouncementRepository, InMemoryAttendanceRepository, InMemoryExamResultRepository,
    InMemoryFeeRepository, InMemoryHomeworkRepository, InMemoryReportRepository,
    InMemoryUserRepository,
};

/// URI handed to the supervisor for the in-memory backend, which has nothing to dial.
pub const MEMORY_URI: &str = "memory://local";

impl From<BackendKind> for StorageBackend {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Postgres => StorageBackend::PostgreSQL,
            BackendKind::Memory => StorageBackend::InMemory,
        }
    }
}

pub fn create_user_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn UserRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryUserRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresUserRepository::new(driver.clone())),
    }
}

pub fn create_fee_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn FeeRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryFeeRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresFeeRepository::new(driver.clone())),
    }
}

pub fn create_exam_result_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn ExamResultRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryExamResultRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresExamResultRepository::new(driver.clone())),
    }
}

pub fn create_report_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn ReportRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryReportRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresReportRepository::new(driver.clone())),
    }
}

pub fn create_attendance_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn AttendanceRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryAttendanceRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresAttendanceRepository::new(driver.clone())),
    }
}

pub fn create_homework_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn HomeworkRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryHomeworkRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresHomeworkRepository::new(driver.clone())),
    }
}

pub fn create_announcement_repository(
    backend: &StorageBackend,
    driver: &Arc<PostgresDriver>,
) -> Arc<dyn AnnouncementRepository> {
    match backend {
        StorageBackend::InMemory => Arc::new(InMemoryAnnouncementRepository::new()),
        StorageBackend::PostgreSQL => Arc::new(PostgresAnnouncementRepository::new(driver.clone())),
    }
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub fees: Arc<dyn FeeRepository>,
    pub results: Arc<dyn ExamResultRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub homework: Arc<dyn HomeworkRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
}

/// Driver, repositories and the URI the supervisor should dial.
pub struct Store {
    pub backend: StorageBackend,
    pub driver: Arc<dyn StoreDriver>,
    pub repositories: Repositories,
    pub uri: Option<String>,
}

pub fn create_store(config: &DatabaseConfig) -> Store {
    let backend = StorageBackend::from(config.backend);
    let pg = Arc::new(PostgresDriver::new());
    let repositories = Repositories {
        users: create_user_repository(&backend, &pg),
        fees: create_fee_repository(&backend, &pg),
        results: create_exam_result_repository(&backend, &pg),
        reports: create_report_repository(&backend, &pg),
        attendance: create_attendance_repository(&backend, &pg),
        homework: create_homework_repository(&backend, &pg),
        announcements: create_announcement_repository(&backend, &pg),
    };
    let (driver, uri): (Arc<dyn StoreDriver>, Option<String>) = match backend {
        StorageBackend::PostgreSQL => (pg, config.uri.clone().filter(|u| !u.trim().is_empty())),
        StorageBackend::InMemory => (Arc::new(InMemoryDriver::new()), Some(MEMORY_URI.to_string())),
    };
    Store {
        backend,
        driver,
        repositories,
        uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_gets_placeholder_uri() {
        let store = create_store(&DatabaseConfig {
            backend: BackendKind::Memory,
            uri: None,
        });
        assert!(matches!(store.backend, StorageBackend::InMemory));
        assert_eq!(store.uri.as_deref(), Some(MEMORY_URI));
    }

    #[test]
    fn test_blank_postgres_uri_counts_as_unset() {
        let store = create_store(&DatabaseConfig {
            backend: BackendKind::Postgres,
            uri: Some("  ".to_string()),
        });
        assert!(store.uri.is_none());
    }
}
