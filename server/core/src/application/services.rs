// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use crate::application::announcements::AnnouncementService;
use crate::application::attendance::AttendanceService;
use crate::application::auth::TokenService;
use crate::application::fees::FeeService;
use crate::application::homework::HomeworkService;
use crate::application::reports::{ReportService, ReportSources};
use crate::application::repository_factory::Repositories;
use crate::application::results::ResultService;
use crate::application::users::UserService;

/// Every record service, wired to one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub fees: Arc<FeeService>,
    pub results: Arc<ResultService>,
    pub reports: Arc<ReportService>,
    pub announcements: Arc<AnnouncementService>,
    pub attendance: Arc<AttendanceService>,
    pub homework: Arc<HomeworkService>,
}

impl Services {
    pub fn new(repos: &Repositories, tokens: TokenService) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.users.clone(), tokens)),
            fees: Arc::new(FeeService::new(repos.fees.clone(), repos.users.clone())),
            results: Arc::new(ResultService::new(repos.results.clone(), repos.users.clone())),
            reports: Arc::new(ReportService::new(
                repos.reports.clone(),
                ReportSources {
                    users: repos.users.clone(),
                    attendance: repos.attendance.clone(),
                    homework: repos.homework.clone(),
                    fees: repos.fees.clone(),
                    results: repos.results.clone(),
                },
            )),
            announcements: Arc::new(AnnouncementService::new(
                repos.announcements.clone(),
                repos.users.clone(),
            )),
            attendance: Arc::new(AttendanceService::new(
                repos.attendance.clone(),
                repos.users.clone(),
            )),
            homework: Arc::new(HomeworkService::new(repos.homework.clone())),
        }
    }
}
