pub const BAD_REQUEST: &str = "🔴 Bad Request";
pub const UNAUTHORIZED: &str = "🔴 Unauthorized Access !";
pub const OPERATION_UNSUCCESSFUL: &str = "🔴 Operation was unsuccessful!";
pub const OPERATION_SUCCESSFUL: &str = "🟢 Operation was successful";

/// Status strings returned in every response body. Built once by
/// [`Messages::catalog`] and held in `AppState`.
#[derive(Debug, Clone)]
pub struct Messages {
    pub common: CommonMessages,
    pub game: GameMessages,
    pub error_log: ErrorLogMessages,
    pub missed_word: MissedWordMessages,
    pub user: UserMessages,
    pub report: ReportMessages,
    pub academic: AcademicMessages,
}

#[derive(Debug, Clone)]
pub struct CommonMessages {
    pub bad_request: &'static str,
    pub unauthorized: &'static str,
    pub invalid_email: &'static str,
    pub not_found: &'static str,
    pub method_not_allowed: &'static str,
    pub operation_successful: &'static str,
    pub operation_unsuccessful: &'static str,
}

#[derive(Debug, Clone)]
pub struct GameMessages {
    pub score_insert_success: &'static str,
    pub invalid_fields: &'static str,
    pub fetch_success: &'static str,
    pub fetch_error: &'static str,
}

#[derive(Debug, Clone)]
pub struct ErrorLogMessages {
    pub log_insert_success: &'static str,
    pub logs_fetch_success: &'static str,
    pub fetch_error: &'static str,
    pub email_fetch_error: &'static str,
}

#[derive(Debug, Clone)]
pub struct MissedWordMessages {
    pub insert_success: &'static str,
    pub fetch_success: &'static str,
    pub fetch_error: &'static str,
}

#[derive(Debug, Clone)]
pub struct UserMessages {
    pub insert_success: &'static str,
    pub fetch_success: &'static str,
    pub fetch_error: &'static str,
    pub count_error: &'static str,
}

#[derive(Debug, Clone)]
pub struct ReportMessages {
    pub invalid_platform: &'static str,
    pub invalid_date: &'static str,
    pub increment_success: &'static str,
    pub new_log_success: &'static str,
    pub update_count_error: &'static str,
    pub fetch_success: &'static str,
    pub fetch_error: &'static str,
    pub summary_error: &'static str,
}

#[derive(Debug, Clone)]
pub struct AcademicMessages {
    pub top_subjects_error: &'static str,
    pub lab_subjects_error: &'static str,
    pub top_labs_error: &'static str,
    pub subject_update_error: &'static str,
    pub lab_update_error: &'static str,
}

impl Messages {
    pub fn catalog() -> Self {
        Self {
            common: CommonMessages {
                bad_request: BAD_REQUEST,
                unauthorized: UNAUTHORIZED,
                invalid_email: "🔴 Bad Request, Invalid Email",
                not_found: "🔴 Not Found",
                method_not_allowed: "🔴 Method Not Allowed",
                operation_successful: OPERATION_SUCCESSFUL,
                operation_unsuccessful: OPERATION_UNSUCCESSFUL,
            },
            game: GameMessages {
                score_insert_success: "🟢 Game score insertion was successful",
                invalid_fields: "🔴 Bad Request - Invalid or missing fields",
                fetch_success: "🟢 Hall of fame fetching was successful",
                fetch_error: "🔴 Error while fetching hof",
            },
            error_log: ErrorLogMessages {
                log_insert_success: "🟢 New Error log insertion was successful",
                logs_fetch_success: "🟢 Logs Data fetching was successful",
                fetch_error: "🔴 Error while fetching logs",
                email_fetch_error: "🔴 Error while fetching logs by email",
            },
            missed_word: MissedWordMessages {
                insert_success: "🟢 Word insertion was successful",
                fetch_success: "🟢 Missed words fetching was successful",
                fetch_error: "🔴 Error while fetching missed words",
            },
            user: UserMessages {
                insert_success: "🟢 New user info insertion was successful",
                fetch_success: "🟢 App users fetching was successful",
                fetch_error: "🔴 Error while fetching app users",
                count_error: "🔴 Error while fetching app user count",
            },
            report: ReportMessages {
                invalid_platform: "🔴 Bad Request - Invalid Platform",
                invalid_date: "🔴 Bad Request - Invalid Date",
                increment_success: "🟢 Incrementing api call count was successful",
                new_log_success: "🟢 Creating new log entry was successful",
                update_count_error: "🔴 Error while updating daily api count!",
                fetch_success: "🟢 Daily report fetching was successful",
                fetch_error: "🔴 Error while fetching daily report",
                summary_error: "🔴 Error while computing daily report summary",
            },
            academic: AcademicMessages {
                top_subjects_error: "🔴 Error while retrieving top note subjects",
                lab_subjects_error: "🔴 Error while retrieving lab subjects",
                top_labs_error: "🔴 Error while retrieving top lab subjects",
                subject_update_error: "🔴 Error while updating count for subject",
                lab_update_error: "🔴 Error while updating count for lab",
            },
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::catalog()
    }
}
