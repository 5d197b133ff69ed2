pub mod course;
pub mod department;
pub mod enrollment;
pub mod instructor;
pub mod student;

pub use course::{Course, CourseApprovalRequest, NewCourseRequest, UpdateCourseRequest};
pub use department::{Department, NewDepartmentRequest, UpdateDepartmentRequest};
pub use enrollment::{
    Enrollment, EnrollmentFilter, EnrollmentStatus, NewEnrollmentRequest, SelfEnrollRequest,
    UpdateEnrollmentRequest,
};
pub use instructor::{Instructor, NewInstructorRequest, UpdateInstructorRequest};
pub use student::{NewStudentRequest, Student, UpdateStudentRequest};
