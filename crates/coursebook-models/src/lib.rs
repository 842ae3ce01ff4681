//! # Coursebook Models
//!
//! Database rows, request DTOs and response bodies for the Coursebook API.
//!
//! - [`auth`]: signup, login, refresh and password-reset payloads; cached login/session records
//! - [`users`]: profiles and profile updates
//! - [`teachers`]: teacher profile and role changes
//! - [`courses`]: courses, schedules, listing filters and course reports
//! - [`grades`]: grades and grade statistics
//! - [`enrollments`]: student enrollments

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod grades;
pub mod teachers;
pub mod users;

pub use auth::{
    AuthResponse, ForgotPasswordRequest, LoginRecord, LoginRequest, MessageResponse,
    RefreshTokenRequest, ResetPasswordRequest, ResetTokenRecord, SessionInfo, SignupRequest,
};
pub use courses::{
    Course, CourseBrief, CourseDetail, CourseQuery, CourseRow, CourseSchedulesResponse,
    CourseStatisticsResponse, CourseWithSchedules, CourseWithTeacher, CreateCourseDto,
    EnrolledStudent, EnrolledStudentRow, EnrolledStudentsResponse, EnrollmentStats, GradeStats,
    PaginatedCoursesResponse, PaginatedCoursesWithSchedules, Schedule, ScheduleDto,
    TeacherSummary, UpdateCourseDto,
};
pub use enrollments::{EnrollDto, Enrollment, MyEnrollment};
pub use grades::{
    CourseGradeStatistics, CourseGradesResponse, CreateGradeDto, Grade, GradeDistribution,
    GradeWithStudent, UpdateGradeDto,
};
pub use teachers::{
    RoleChange, RoleChangeResponse, Teacher, TeacherProfile, UpdateUserRoleDto, plan_role_change,
};
pub use users::{AvatarResponse, ChangePasswordDto, RoleUser, UpdateProfileDto, User, UserProfile};
