use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use capacity_planner::api::{create_router, ErrorBody, USER_ID_HEADER};
use capacity_planner::db::Database;
use capacity_planner::models::*;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid date")
}

fn user_header() -> HeaderName {
    HeaderName::from_static(USER_ID_HEADER)
}

fn as_user(user: &User) -> HeaderValue {
    HeaderValue::from_str(&user.id.to_string()).expect("Invalid header value")
}

async fn register(server: &TestServer, role: UserRole, name: &str, skills: &[&str]) -> User {
    let seniority = match role {
        UserRole::Engineer => Some(Seniority::Senior),
        UserRole::Manager => None,
    };
    server
        .post("/api/v1/users")
        .json(&CreateUserInput {
            email: format!("{}@example.com", Uuid::new_v4()),
            name: name.to_string(),
            role,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            seniority,
            max_capacity: None,
            department: None,
        })
        .await
        .json::<User>()
}

async fn create_test_project(server: &TestServer, manager: &User) -> Project {
    server
        .post("/api/v1/projects")
        .add_header(user_header(), as_user(manager))
        .json(&CreateProjectInput {
            name: "Test Project".to_string(),
            description: "Something to staff".to_string(),
            start_date: day("2024-01-01"),
            end_date: day("2024-12-31"),
            required_skills: vec!["rust".to_string()],
            team_size: 2,
            status: None,
        })
        .await
        .json::<ProjectCreated>()
        .project
}

fn assignment_input(
    engineer: &User,
    project: &Project,
    allocation: u8,
    start: &str,
    end: &str,
) -> CreateAssignmentInput {
    CreateAssignmentInput {
        engineer_id: engineer.id,
        project_id: project.id,
        allocation_percentage: allocation,
        start_date: day(start),
        end_date: day(end),
        role: "Developer".to_string(),
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok_without_a_caller() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn registers_a_user() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&CreateUserInput {
                email: "new@example.com".to_string(),
                name: "New Hire".to_string(),
                role: UserRole::Engineer,
                skills: vec!["rust".to_string()],
                seniority: Some(Seniority::Junior),
                max_capacity: Some(50),
                department: None,
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: User = response.json();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.max_capacity, 50);
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let server = setup();
        let input = CreateUserInput {
            email: "same@example.com".to_string(),
            name: "Same".to_string(),
            role: UserRole::Manager,
            skills: vec![],
            seniority: None,
            max_capacity: None,
            department: None,
        };
        server.post("/api/v1/users").json(&input).await;

        let response = server.post("/api/v1/users").json(&input).await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_engineer_without_seniority() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&CreateUserInput {
                email: "vague@example.com".to_string(),
                name: "Vague".to_string(),
                role: UserRole::Engineer,
                skills: vec![],
                seniority: None,
                max_capacity: None,
                department: None,
            })
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_capacity_outside_the_byte_range_as_json() {
        let server = setup();

        let response = server
            .post("/api/v1/users")
            .json(&json!({
                "email": "huge@example.com",
                "name": "Huge",
                "role": "engineer",
                "seniority": "mid",
                "max_capacity": 300,
            }))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert!(body.message.contains("max_capacity"));
    }
}

mod caller {
    use super::*;

    #[tokio::test]
    async fn requires_the_user_header() {
        let server = setup();

        let response = server.get("/api/v1/engineers").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: ErrorBody = response.json();
        assert_eq!(body.message, "No authenticated user provided");
    }

    #[tokio::test]
    async fn rejects_unknown_user_ids() {
        let server = setup();

        let response = server
            .get("/api/v1/engineers")
            .add_header(
                user_header(),
                HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
            )
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod engineers {
    use super::*;

    #[tokio::test]
    async fn engineers_can_view_themselves_but_not_others() {
        let server = setup();
        let alice = register(&server, UserRole::Engineer, "Alice", &[]).await;
        let bob = register(&server, UserRole::Engineer, "Bob", &[]).await;

        server
            .get(&format!("/api/v1/engineers/{}", alice.id))
            .add_header(user_header(), as_user(&alice))
            .await
            .assert_status_ok();

        server
            .get(&format!("/api/v1/engineers/{}", bob.id))
            .add_header(user_header(), as_user(&alice))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn managers_can_update_engineers() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;

        let response = server
            .put(&format!("/api/v1/engineers/{}", engineer.id))
            .add_header(user_header(), as_user(&manager))
            .json(&UpdateUserInput {
                max_capacity: Some(40),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        let updated: User = response.json();
        assert_eq!(updated.max_capacity, 40);
    }

    #[tokio::test]
    async fn returns_404_for_managers_looked_up_as_engineers() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;

        server
            .get(&format!("/api/v1/engineers/{}", manager.id))
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn searches_by_skill() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        register(&server, UserRole::Engineer, "Rusty", &["Rust"]).await;
        register(&server, UserRole::Engineer, "Pythonista", &["Python"]).await;

        let response = server
            .get("/api/v1/engineers/search")
            .add_query_param("skills", "rust,go")
            .add_header(user_header(), as_user(&manager))
            .await;

        response.assert_status_ok();
        let found: Vec<User> = response.json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rusty");
    }

    #[tokio::test]
    async fn search_requires_skills() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;

        server
            .get("/api/v1/engineers/search")
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status_bad_request();
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn managers_create_projects_with_suitable_engineers() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        register(&server, UserRole::Engineer, "Rusty", &["rust"]).await;

        let response = server
            .post("/api/v1/projects")
            .add_header(user_header(), as_user(&manager))
            .json(&CreateProjectInput {
                name: "Rewrite".to_string(),
                description: "Rewrite it".to_string(),
                start_date: day("2024-01-01"),
                end_date: day("2024-06-30"),
                required_skills: vec!["Rust".to_string()],
                team_size: 1,
                status: Some(ProjectStatus::Active),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: ProjectCreated = response.json();
        assert_eq!(created.project.status, ProjectStatus::Active);
        assert_eq!(created.suitable_engineers.len(), 1);
        assert_eq!(created.suitable_engineers[0].name, "Rusty");
    }

    #[tokio::test]
    async fn engineers_cannot_create_projects() {
        let server = setup();
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;

        let response = server
            .post("/api/v1/projects")
            .add_header(user_header(), as_user(&engineer))
            .json(&CreateProjectInput {
                name: "Nope".to_string(),
                description: "Nope".to_string(),
                start_date: day("2024-01-01"),
                end_date: day("2024-06-30"),
                required_skills: vec![],
                team_size: 1,
                status: None,
            })
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorBody = response.json();
        assert_eq!(body.message, "Access denied. Manager role required.");
    }

    #[tokio::test]
    async fn shows_team_allocation_on_the_given_day() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;
        server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 50, "2024-03-01", "2024-04-30"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .add_query_param("as_of", "2024-03-15")
            .add_header(user_header(), as_user(&engineer))
            .await;

        response.assert_status_ok();
        let details: ProjectDetails = response.json();
        assert_eq!(details.project.id, project.id);
        assert_eq!(details.team_allocation.len(), 1);
        assert_eq!(details.team_allocation[0].engineer.id, engineer.id);
    }

    #[tokio::test]
    async fn deletes_a_project() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let project = create_test_project(&server, &manager).await;

        server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status_not_found();
    }
}

mod assignments {
    use super::*;

    #[tokio::test]
    async fn engineers_cannot_assign_themselves() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;

        server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&engineer))
            .json(&assignment_input(&engineer, &project, 50, "2024-03-01", "2024-04-30"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn returns_409_with_conflicts_when_capacity_is_exceeded() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;

        let existing = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 60, "2024-03-01", "2024-06-30"))
            .await
            .json::<AssignmentDetails>();

        let response = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 50, "2024-04-01", "2024-05-01"))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorBody = response.json();
        assert_eq!(
            body.message,
            "Total allocation of 110% exceeds engineer's capacity of 100% during this period"
        );
        assert_eq!(body.conflicts.len(), 1);
        assert_eq!(body.conflicts[0].id, existing.assignment.id);
    }

    #[tokio::test]
    async fn rejects_an_inverted_range() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;

        let response = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 10, "2024-05-01", "2024-04-01"))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert_eq!(body.message, "End date must be after start date");
    }

    #[tokio::test]
    async fn rejects_allocation_outside_the_byte_range_as_json() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;

        for allocation in [300, -5] {
            let response = server
                .post("/api/v1/assignments")
                .add_header(user_header(), as_user(&manager))
                .json(&json!({
                    "engineer_id": engineer.id,
                    "project_id": project.id,
                    "allocation_percentage": allocation,
                    "start_date": "2024-04-01",
                    "end_date": "2024-05-01",
                    "role": "Developer",
                }))
                .await;

            response.assert_status_bad_request();
            let body: ErrorBody = response.json();
            assert!(body.message.contains("allocation_percentage"));
            assert!(body.conflicts.is_empty());
        }
    }

    #[tokio::test]
    async fn answers_an_in_range_but_excessive_allocation_the_same_way() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;

        let response = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 150, "2024-04-01", "2024-05-01"))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert!(body.message.contains("150"));
    }

    #[tokio::test]
    async fn returns_404_for_unknown_engineer() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let project = create_test_project(&server, &manager).await;

        let response = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&manager, &project, 10, "2024-04-01", "2024-05-01"))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn updates_and_deletes_an_assignment() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;
        let created = server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 60, "2024-03-01", "2024-06-30"))
            .await
            .json::<AssignmentDetails>();
        let url = format!("/api/v1/assignments/{}", created.assignment.id);

        let response = server
            .put(&url)
            .add_header(user_header(), as_user(&manager))
            .json(&UpdateAssignmentInput {
                allocation_percentage: Some(100),
                ..Default::default()
            })
            .await;
        response.assert_status_ok();
        let updated: AssignmentDetails = response.json();
        assert_eq!(updated.assignment.allocation_percentage, 100);

        server
            .delete(&url)
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&url)
            .add_header(user_header(), as_user(&manager))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn update_returns_404_for_unknown_assignment() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;

        server
            .put(&format!("/api/v1/assignments/{}", Uuid::new_v4()))
            .add_header(user_header(), as_user(&manager))
            .json(&UpdateAssignmentInput::default())
            .await
            .assert_status_not_found();
    }
}

mod capacity {
    use super::*;

    #[tokio::test]
    async fn reports_available_capacity_on_a_given_day() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;
        server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 40, "2024-04-01", "2024-05-01"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/engineers/{}/capacity", engineer.id))
            .add_query_param("as_of", "2024-04-15")
            .add_header(user_header(), as_user(&engineer))
            .await;

        response.assert_status_ok();
        let report: CapacityReport = response.json();
        assert_eq!(report.allocated_capacity, 40);
        assert_eq!(report.available_capacity, 60);

        let response = server
            .get("/api/v1/engineers/capacity")
            .add_query_param("as_of", "2024-06-01")
            .add_header(user_header(), as_user(&manager))
            .await;

        response.assert_status_ok();
        let reports: Vec<CapacityReport> = response.json();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].available_capacity, 100);
    }

    #[tokio::test]
    async fn availability_requires_both_dates() {
        let server = setup();
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;

        let response = server
            .get(&format!("/api/v1/engineers/{}/availability", engineer.id))
            .add_query_param("start_date", "2024-04-01")
            .add_header(user_header(), as_user(&engineer))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert_eq!(body.message, "Start and end date required");
    }

    #[tokio::test]
    async fn availability_sums_overlapping_assignments() {
        let server = setup();
        let manager = register(&server, UserRole::Manager, "Boss", &[]).await;
        let engineer = register(&server, UserRole::Engineer, "Worker", &[]).await;
        let project = create_test_project(&server, &manager).await;
        server
            .post("/api/v1/assignments")
            .add_header(user_header(), as_user(&manager))
            .json(&assignment_input(&engineer, &project, 30, "2024-04-01", "2024-05-01"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/engineers/{}/availability", engineer.id))
            .add_query_param("start_date", "2024-05-01")
            .add_query_param("end_date", "2024-05-31")
            .add_header(user_header(), as_user(&manager))
            .await;

        response.assert_status_ok();
        let report: AvailabilityReport = response.json();
        assert_eq!(report.available_capacity, 70);
        assert_eq!(report.assignments.len(), 1);
    }
}
