use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use coursebook_auth::TokenPair;
use coursebook_core::pagination::{PaginationMeta, PaginationParams};
use coursebook_models::{
    AuthResponse, AvatarResponse, ChangePasswordDto, Course, CourseBrief, CourseDetail,
    CourseGradeStatistics, CourseGradesResponse, CourseSchedulesResponse,
    CourseStatisticsResponse, CourseWithSchedules, CourseWithTeacher, CreateCourseDto,
    CreateGradeDto, EnrollDto, EnrolledStudent, EnrolledStudentsResponse, Enrollment,
    EnrollmentStats, ForgotPasswordRequest, Grade, GradeDistribution, GradeStats,
    GradeWithStudent, LoginRequest, MessageResponse, MyEnrollment, PaginatedCoursesResponse,
    PaginatedCoursesWithSchedules, RefreshTokenRequest, ResetPasswordRequest, RoleChangeResponse,
    RoleUser, Schedule, ScheduleDto, SessionInfo, SignupRequest, TeacherProfile, TeacherSummary,
    UpdateCourseDto, UpdateGradeDto, UpdateProfileDto, UpdateUserRoleDto, UserProfile,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::get_session,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::update_avatar,
        crate::modules::users::controller::change_password,
        crate::modules::teachers::controller::update_user_role,
        crate::modules::teachers::controller::get_my_profile,
        crate::modules::teachers::controller::get_my_courses,
        crate::modules::teachers::controller::get_course_enrollments,
        crate::modules::teachers::controller::assign_grade,
        crate::modules::teachers::controller::update_grade,
        crate::modules::teachers::controller::get_course_grades,
        crate::modules::teachers::controller::get_course_statistics,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::get_enrolled_students,
        crate::modules::courses::controller::get_course_schedules,
        crate::modules::courses::controller::get_course_statistics,
        crate::modules::enrollments::controller::enroll,
        crate::modules::enrollments::controller::my_enrollments,
        crate::modules::enrollments::controller::unenroll,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            SignupRequest,
            LoginRequest,
            AuthResponse,
            TokenPair,
            RefreshTokenRequest,
            SessionInfo,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UserProfile,
            UpdateProfileDto,
            ChangePasswordDto,
            AvatarResponse,
            UpdateUserRoleDto,
            RoleChangeResponse,
            RoleUser,
            TeacherProfile,
            TeacherSummary,
            Course,
            CourseBrief,
            CourseDetail,
            CourseWithTeacher,
            CourseWithSchedules,
            CreateCourseDto,
            UpdateCourseDto,
            Schedule,
            ScheduleDto,
            PaginatedCoursesResponse,
            PaginatedCoursesWithSchedules,
            EnrolledStudent,
            EnrolledStudentsResponse,
            CourseSchedulesResponse,
            CourseStatisticsResponse,
            EnrollmentStats,
            GradeStats,
            Grade,
            GradeWithStudent,
            CreateGradeDto,
            UpdateGradeDto,
            GradeDistribution,
            CourseGradeStatistics,
            CourseGradesResponse,
            Enrollment,
            EnrollDto,
            MyEnrollment,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login, tokens and password reset"),
        (name = "Profile", description = "The caller's own profile, avatar and password"),
        (name = "Teachers", description = "Teacher role management, teacher profile and grading"),
        (name = "Courses", description = "Course management, schedules and reports"),
        (name = "Enrollments", description = "Student enrollments")
    ),
    info(
        title = "Coursebook API",
        version = "0.1.0",
        description = "Learning-management REST API: accounts, courses with weekly schedules, enrollments and grades.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
