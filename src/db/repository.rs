use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentStatus, Course, Department, NewAssignmentRequest, NewCourseRequest,
    NewDepartmentRequest, NewStudentRequest, NewTeacherRequest, Student, Teacher,
    UpdateAssignmentRequest, UpdateCourseRequest, UpdateDepartmentRequest, UpdateStudentRequest,
    UpdateTeacherRequest,
};

const COURSE_COLUMNS: &str =
    "id, name, code, credit_hours, instructor, semester, current_grade, color, is_archived, updated_at, sync_state, last_synced_at";

const ASSIGNMENT_COLUMNS: &str =
    "id, course_id, title, description, due_date, priority, status, grade, points_earned, points_total, is_archived, updated_at, sync_state, last_synced_at";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

// ---------------------------------------------------------------------------
// Courses

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE is_archived = 0 ORDER BY updated_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_all_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY updated_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        code: req.code,
        credit_hours: req.credit_hours,
        instructor: req.instructor,
        semester: req.semester,
        current_grade: req.current_grade.filter(|g| !g.is_empty()),
        color: req.color,
        is_archived: false,
        updated_at: now_rfc3339(),
        sync_state: "pending".to_string(),
        last_synced_at: None,
    };

    sqlx::query(&format!(
        "INSERT INTO courses ({COURSE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&course.id)
    .bind(&course.name)
    .bind(&course.code)
    .bind(course.credit_hours)
    .bind(&course.instructor)
    .bind(&course.semester)
    .bind(&course.current_grade)
    .bind(&course.color)
    .bind(course.is_archived)
    .bind(&course.updated_at)
    .bind(&course.sync_state)
    .bind(&course.last_synced_at)
    .execute(db)
    .await?;

    Ok(course)
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(code) = req.code {
        current.code = code;
    }
    if let Some(credit_hours) = req.credit_hours {
        current.credit_hours = credit_hours;
    }
    if let Some(instructor) = req.instructor {
        current.instructor = instructor;
    }
    if let Some(semester) = req.semester {
        current.semester = semester;
    }
    if let Some(grade) = req.current_grade {
        // Empty string clears the grade back to ungraded.
        current.current_grade = if grade.is_empty() { None } else { Some(grade) };
    }
    if let Some(color) = req.color {
        current.color = color;
    }
    current.updated_at = now_rfc3339();
    current.sync_state = "pending".to_string();

    sqlx::query(
        "UPDATE courses SET name = ?, code = ?, credit_hours = ?, instructor = ?, semester = ?, current_grade = ?, color = ?, updated_at = ?, sync_state = ? WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.code)
    .bind(current.credit_hours)
    .bind(&current.instructor)
    .bind(&current.semester)
    .bind(&current.current_grade)
    .bind(&current.color)
    .bind(&current.updated_at)
    .bind(&current.sync_state)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn archive_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE courses SET is_archived = 1, updated_at = ?, sync_state = 'pending' WHERE id = ?",
    )
    .bind(now_rfc3339())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(rows > 0)
}

pub async fn upsert_course(db: &SqlitePool, course: &Course) -> Result<Course, sqlx::Error> {
    match find_course_by_id(db, &course.id).await? {
        Some(_) => {
            sqlx::query(
                "UPDATE courses SET name = ?, code = ?, credit_hours = ?, instructor = ?, semester = ?, current_grade = ?, color = ?, is_archived = ?, updated_at = ?, sync_state = ?, last_synced_at = ? WHERE id = ?",
            )
            .bind(&course.name)
            .bind(&course.code)
            .bind(course.credit_hours)
            .bind(&course.instructor)
            .bind(&course.semester)
            .bind(&course.current_grade)
            .bind(&course.color)
            .bind(course.is_archived)
            .bind(&course.updated_at)
            .bind(&course.sync_state)
            .bind(&course.last_synced_at)
            .bind(&course.id)
            .execute(db)
            .await?;
        }
        None => {
            sqlx::query(&format!(
                "INSERT INTO courses ({COURSE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ))
            .bind(&course.id)
            .bind(&course.name)
            .bind(&course.code)
            .bind(course.credit_hours)
            .bind(&course.instructor)
            .bind(&course.semester)
            .bind(&course.current_grade)
            .bind(&course.color)
            .bind(course.is_archived)
            .bind(&course.updated_at)
            .bind(&course.sync_state)
            .bind(&course.last_synced_at)
            .execute(db)
            .await?;
        }
    }

    find_course_by_id(db, &course.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

// ---------------------------------------------------------------------------
// Assignments

pub async fn fetch_assignments(db: &SqlitePool) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE is_archived = 0 ORDER BY due_date ASC"
    ))
    .fetch_all(db)
    .await
}

pub async fn fetch_all_assignments(db: &SqlitePool) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY due_date ASC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_assignment_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_assignment(
    db: &SqlitePool,
    req: NewAssignmentRequest,
) -> Result<Assignment, sqlx::Error> {
    let assignment = Assignment {
        id: Uuid::new_v4().to_string(),
        course_id: req.course_id,
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        priority: req.priority,
        status: req.status,
        grade: req.grade.filter(|g| !g.is_empty()),
        points_earned: req.points_earned,
        points_total: req.points_total,
        is_archived: false,
        updated_at: now_rfc3339(),
        sync_state: "pending".to_string(),
        last_synced_at: None,
    };

    sqlx::query(&format!(
        "INSERT INTO assignments ({ASSIGNMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&assignment.id)
    .bind(&assignment.course_id)
    .bind(&assignment.title)
    .bind(&assignment.description)
    .bind(assignment.due_date)
    .bind(assignment.priority)
    .bind(assignment.status)
    .bind(&assignment.grade)
    .bind(assignment.points_earned)
    .bind(assignment.points_total)
    .bind(assignment.is_archived)
    .bind(&assignment.updated_at)
    .bind(&assignment.sync_state)
    .bind(&assignment.last_synced_at)
    .execute(db)
    .await?;

    Ok(assignment)
}

pub async fn update_assignment(
    db: &SqlitePool,
    id: &str,
    req: UpdateAssignmentRequest,
) -> Result<Option<Assignment>, sqlx::Error> {
    let mut current = match find_assignment_by_id(db, id).await? {
        Some(a) => a,
        None => return Ok(None),
    };

    if let Some(course_id) = req.course_id {
        current.course_id = course_id;
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(due_date) = req.due_date {
        current.due_date = due_date;
    }
    if let Some(priority) = req.priority {
        current.priority = priority;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(grade) = req.grade {
        current.grade = if grade.is_empty() { None } else { Some(grade) };
    }
    if let Some(points_earned) = req.points_earned {
        current.points_earned = Some(points_earned);
    }
    if let Some(points_total) = req.points_total {
        current.points_total = Some(points_total);
    }
    current.updated_at = now_rfc3339();
    current.sync_state = "pending".to_string();

    sqlx::query(
        "UPDATE assignments SET course_id = ?, title = ?, description = ?, due_date = ?, priority = ?, status = ?, grade = ?, points_earned = ?, points_total = ?, updated_at = ?, sync_state = ? WHERE id = ?",
    )
    .bind(&current.course_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.due_date)
    .bind(current.priority)
    .bind(current.status)
    .bind(&current.grade)
    .bind(current.points_earned)
    .bind(current.points_total)
    .bind(&current.updated_at)
    .bind(&current.sync_state)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Status toggle, a first-class operation distinct from a full edit.
pub async fn set_assignment_status(
    db: &SqlitePool,
    id: &str,
    status: AssignmentStatus,
) -> Result<Option<Assignment>, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE assignments SET status = ?, updated_at = ?, sync_state = 'pending' WHERE id = ?",
    )
    .bind(status)
    .bind(now_rfc3339())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if rows == 0 {
        return Ok(None);
    }
    find_assignment_by_id(db, id).await
}

pub async fn archive_assignment(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE assignments SET is_archived = 1, updated_at = ?, sync_state = 'pending' WHERE id = ?",
    )
    .bind(now_rfc3339())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(rows > 0)
}

pub async fn unarchive_assignment(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE assignments SET is_archived = 0, updated_at = ?, sync_state = 'pending' WHERE id = ?",
    )
    .bind(now_rfc3339())
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(rows > 0)
}

pub async fn upsert_assignment(
    db: &SqlitePool,
    assignment: &Assignment,
) -> Result<Assignment, sqlx::Error> {
    match find_assignment_by_id(db, &assignment.id).await? {
        Some(_) => {
            sqlx::query(
                "UPDATE assignments SET course_id = ?, title = ?, description = ?, due_date = ?, priority = ?, status = ?, grade = ?, points_earned = ?, points_total = ?, is_archived = ?, updated_at = ?, sync_state = ?, last_synced_at = ? WHERE id = ?",
            )
            .bind(&assignment.course_id)
            .bind(&assignment.title)
            .bind(&assignment.description)
            .bind(assignment.due_date)
            .bind(assignment.priority)
            .bind(assignment.status)
            .bind(&assignment.grade)
            .bind(assignment.points_earned)
            .bind(assignment.points_total)
            .bind(assignment.is_archived)
            .bind(&assignment.updated_at)
            .bind(&assignment.sync_state)
            .bind(&assignment.last_synced_at)
            .bind(&assignment.id)
            .execute(db)
            .await?;
        }
        None => {
            sqlx::query(&format!(
                "INSERT INTO assignments ({ASSIGNMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ))
            .bind(&assignment.id)
            .bind(&assignment.course_id)
            .bind(&assignment.title)
            .bind(&assignment.description)
            .bind(assignment.due_date)
            .bind(assignment.priority)
            .bind(assignment.status)
            .bind(&assignment.grade)
            .bind(assignment.points_earned)
            .bind(assignment.points_total)
            .bind(assignment.is_archived)
            .bind(&assignment.updated_at)
            .bind(&assignment.sync_state)
            .bind(&assignment.last_synced_at)
            .execute(db)
            .await?;
        }
    }

    find_assignment_by_id(db, &assignment.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

// ---------------------------------------------------------------------------
// Students

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, name, email, major, year, gpa, phone, enrollment_date, updated_at FROM students ORDER BY name ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, name, email, major, year, gpa, phone, enrollment_date, updated_at FROM students WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_student(db: &SqlitePool, req: NewStudentRequest) -> Result<Student, sqlx::Error> {
    let student = Student {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        major: req.major,
        year: req.year,
        gpa: req.gpa,
        phone: req.phone,
        enrollment_date: req
            .enrollment_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        updated_at: now_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO students (id, name, email, major, year, gpa, phone, enrollment_date, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&student.id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.major)
    .bind(&student.year)
    .bind(student.gpa)
    .bind(&student.phone)
    .bind(student.enrollment_date)
    .bind(&student.updated_at)
    .execute(db)
    .await?;

    Ok(student)
}

pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    req: UpdateStudentRequest,
) -> Result<Option<Student>, sqlx::Error> {
    let mut current = match find_student_by_id(db, id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email) = req.email {
        current.email = email;
    }
    if let Some(major) = req.major {
        current.major = major;
    }
    if let Some(year) = req.year {
        current.year = year;
    }
    if let Some(gpa) = req.gpa {
        current.gpa = gpa;
    }
    if let Some(phone) = req.phone {
        current.phone = phone;
    }
    if let Some(enrollment_date) = req.enrollment_date {
        current.enrollment_date = enrollment_date;
    }
    current.updated_at = now_rfc3339();

    sqlx::query(
        "UPDATE students SET name = ?, email = ?, major = ?, year = ?, gpa = ?, phone = ?, enrollment_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.major)
    .bind(&current.year)
    .bind(current.gpa)
    .bind(&current.phone)
    .bind(current.enrollment_date)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(rows > 0)
}

// ---------------------------------------------------------------------------
// Teachers

pub async fn fetch_teachers(db: &SqlitePool) -> Result<Vec<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(
        "SELECT id, name, email, phone, department, employee_id, updated_at FROM teachers ORDER BY name ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_teacher_by_id(db: &SqlitePool, id: &str) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(
        "SELECT id, name, email, phone, department, employee_id, updated_at FROM teachers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_teacher(db: &SqlitePool, req: NewTeacherRequest) -> Result<Teacher, sqlx::Error> {
    let teacher = Teacher {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        department: req.department,
        employee_id: req.employee_id,
        updated_at: now_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO teachers (id, name, email, phone, department, employee_id, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&teacher.id)
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.phone)
    .bind(&teacher.department)
    .bind(&teacher.employee_id)
    .bind(&teacher.updated_at)
    .execute(db)
    .await?;

    Ok(teacher)
}

pub async fn update_teacher(
    db: &SqlitePool,
    id: &str,
    req: UpdateTeacherRequest,
) -> Result<Option<Teacher>, sqlx::Error> {
    let mut current = match find_teacher_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email) = req.email {
        current.email = email;
    }
    if let Some(phone) = req.phone {
        current.phone = phone;
    }
    if let Some(department) = req.department {
        current.department = department;
    }
    if let Some(employee_id) = req.employee_id {
        current.employee_id = employee_id;
    }
    current.updated_at = now_rfc3339();

    sqlx::query(
        "UPDATE teachers SET name = ?, email = ?, phone = ?, department = ?, employee_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.email)
    .bind(&current.phone)
    .bind(&current.department)
    .bind(&current.employee_id)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_teacher(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(rows > 0)
}

// ---------------------------------------------------------------------------
// Departments

pub async fn fetch_departments(db: &SqlitePool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, name, description, head_of_department, updated_at FROM departments ORDER BY name ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_department_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        "SELECT id, name, description, head_of_department, updated_at FROM departments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_department(
    db: &SqlitePool,
    req: NewDepartmentRequest,
) -> Result<Department, sqlx::Error> {
    let department = Department {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        head_of_department: req.head_of_department,
        updated_at: now_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO departments (id, name, description, head_of_department, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&department.id)
    .bind(&department.name)
    .bind(&department.description)
    .bind(&department.head_of_department)
    .bind(&department.updated_at)
    .execute(db)
    .await?;

    Ok(department)
}

pub async fn update_department(
    db: &SqlitePool,
    id: &str,
    req: UpdateDepartmentRequest,
) -> Result<Option<Department>, sqlx::Error> {
    let mut current = match find_department_by_id(db, id).await? {
        Some(d) => d,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(head) = req.head_of_department {
        current.head_of_department = head;
    }
    current.updated_at = now_rfc3339();

    sqlx::query(
        "UPDATE departments SET name = ?, description = ?, head_of_department = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.description)
    .bind(&current.head_of_department)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_department(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::Priority;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn new_course(name: &str, credits: i32, grade: Option<&str>) -> NewCourseRequest {
        NewCourseRequest {
            name: name.to_string(),
            code: "CS 101".to_string(),
            credit_hours: credits,
            instructor: "Dr. Reed".to_string(),
            semester: "Fall 2024".to_string(),
            current_grade: grade.map(str::to_string),
            color: "#4f46e5".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, new_course("Intro to CS", 3, Some("A")))
            .await
            .expect("Failed to insert course");
        assert_eq!(course.name, "Intro to CS");
        assert_eq!(course.sync_state, "pending");
        assert!(!course.is_archived);

        let courses = fetch_courses(&pool).await.expect("Failed to fetch courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, course.id);
        assert_eq!(courses[0].current_grade.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_update_course_clears_grade_with_empty_string() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, new_course("Calculus", 4, Some("B+")))
            .await
            .expect("Failed to insert course");

        let updated = update_course(
            &pool,
            &course.id,
            UpdateCourseRequest {
                name: None,
                code: None,
                credit_hours: Some(5),
                instructor: None,
                semester: None,
                current_grade: Some(String::new()),
                color: None,
            },
        )
        .await
        .expect("Failed to update course")
        .expect("Course not found");

        assert_eq!(updated.credit_hours, 5);
        assert_eq!(updated.current_grade, None);
        assert_eq!(updated.sync_state, "pending");
    }

    #[tokio::test]
    async fn test_assignment_status_toggle_roundtrip() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, new_course("Physics", 3, None))
            .await
            .expect("Failed to insert course");

        let assignment = insert_assignment(
            &pool,
            NewAssignmentRequest {
                course_id: course.id.clone(),
                title: "Lab report".to_string(),
                description: String::new(),
                due_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
                priority: Priority::High,
                status: AssignmentStatus::Pending,
                grade: None,
                points_earned: None,
                points_total: None,
            },
        )
        .await
        .expect("Failed to insert assignment");

        let completed = set_assignment_status(&pool, &assignment.id, AssignmentStatus::Completed)
            .await
            .expect("Failed to set status")
            .expect("Assignment not found");
        assert_eq!(completed.status, AssignmentStatus::Completed);

        // Reopening is always allowed.
        let reopened = set_assignment_status(&pool, &assignment.id, AssignmentStatus::Pending)
            .await
            .expect("Failed to set status")
            .expect("Assignment not found");
        assert_eq!(reopened.status, AssignmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_archived_assignments_are_hidden_from_fetch() {
        let pool = setup_test_db().await;

        let assignment = insert_assignment(
            &pool,
            NewAssignmentRequest {
                course_id: "missing-course".to_string(),
                title: "Essay".to_string(),
                description: String::new(),
                due_date: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
                priority: Priority::Low,
                status: AssignmentStatus::Pending,
                grade: None,
                points_earned: None,
                points_total: None,
            },
        )
        .await
        .expect("Failed to insert assignment");

        assert!(archive_assignment(&pool, &assignment.id).await.unwrap());

        let visible = fetch_assignments(&pool).await.unwrap();
        assert!(visible.is_empty());

        let all = fetch_all_assignments(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_archived);

        assert!(unarchive_assignment(&pool, &assignment.id).await.unwrap());
        assert_eq!(fetch_assignments(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_student_crud() {
        let pool = setup_test_db().await;

        let student = insert_student(
            &pool,
            NewStudentRequest {
                name: "Ada Park".to_string(),
                email: "ada@example.edu".to_string(),
                major: "Computer Science".to_string(),
                year: "Junior".to_string(),
                gpa: 3.6,
                phone: String::new(),
                enrollment_date: None,
            },
        )
        .await
        .expect("Failed to insert student");

        let updated = update_student(
            &pool,
            &student.id,
            UpdateStudentRequest {
                name: None,
                email: None,
                major: Some("Mathematics".to_string()),
                year: None,
                gpa: Some(3.8),
                phone: None,
                enrollment_date: None,
            },
        )
        .await
        .expect("Failed to update student")
        .expect("Student not found");
        assert_eq!(updated.major, "Mathematics");
        assert_eq!(updated.gpa, 3.8);

        assert!(delete_student(&pool, &student.id).await.unwrap());
        assert!(fetch_students(&pool).await.unwrap().is_empty());
        assert!(!delete_student(&pool, &student.id).await.unwrap());
    }
}
