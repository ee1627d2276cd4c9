//! services/console/src/adapters/rest.rs
//!
//! The REST adapter: the concrete implementation of the `AuthApi`,
//! `CollectionApi`, and `ReportsApi` ports against the remote school API
//! (JSON over HTTPS, bearer-token authorization). Wire-level record structs
//! live here and are mapped into the pure domain types with `to_domain()`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use school_console_core::domain::{
    Class, ImportReport, LoginCredentials, NewClass, NewSchool, NewStudent, School,
    SchoolAccount, SchoolPatch, Student, StudentFilters, StudentPatch, Summary, Teacher,
    TeacherForm,
};
use school_console_core::ports::{
    AuthApi, CollectionApi, NoFilters, PortError, PortResult, QueryFilters, ReportsApi,
};

use crate::config::{Config, ConfigError};
use crate::error::ConsoleError;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the remote-API ports.
#[derive(Clone)]
pub struct RestClient {
    base: Url,
    http: reqwest::Client,
}

impl RestClient {
    /// Creates a new `RestClient` from an already-parsed base URL.
    pub fn new(base: Url, http: reqwest::Client) -> Self {
        Self { base, http }
    }

    /// Builds the client from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConsoleError> {
        let base = Url::parse(&config.api_base_url).map_err(|e| {
            ConfigError::InvalidValue("CONSOLE_API_URL".to_string(), e.to_string())
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::new(base, http))
    }

    fn endpoint(&self, path: &str) -> PortResult<Url> {
        self.base
            .join(path)
            .map_err(|e| PortError::Unexpected(format!("invalid endpoint {path}: {e}")))
    }

    fn check(resp: reqwest::Response) -> PortResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(PortError::Remote {
                status: status.as_u16(),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        query: &[(&'static str, String)],
    ) -> PortResult<T> {
        let mut request = self.http.get(self.endpoint(path)?).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        let resp = request.send().await.map_err(transport)?;
        Self::check(resp)?.json().await.map_err(transport)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> PortResult<T> {
        let resp = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp)?.json().await.map_err(transport)
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> PortResult<T> {
        let resp = self
            .http
            .put(self.endpoint(path)?)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp)?.json().await.map_err(transport)
    }

    async fn delete_at(&self, path: &str, token: &str) -> PortResult<()> {
        let resp = self
            .http
            .delete(self.endpoint(path)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp)?;
        Ok(())
    }

    async fn get_bytes(&self, path: &str, token: &str) -> PortResult<Vec<u8>> {
        let resp = self
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let bytes = Self::check(resp)?.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }

    /// Uploads a spreadsheet as multipart form data. The field name `file`
    /// is fixed by the remote API; reqwest sets the multipart content type
    /// with its boundary, which must not be overridden.
    async fn post_spreadsheet(
        &self,
        path: &str,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<ImportReport> {
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);
        let resp = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let record: ImportRecord = Self::check(resp)?.json().await.map_err(transport)?;
        Ok(ImportReport {
            imported: record.imported,
        })
    }
}

fn transport(err: reqwest::Error) -> PortError {
    PortError::Network(err.to_string())
}

//=========================================================================================
// Authentication
//=========================================================================================

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
}

#[async_trait]
impl AuthApi for RestClient {
    async fn login(&self, credentials: &LoginCredentials) -> PortResult<String> {
        let body = LoginBody {
            email: &credentials.email,
            password: &credentials.password,
        };
        let resp = self
            .http
            .post(self.endpoint("/auth/login")?)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::AuthenticationFailed(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::AuthenticationFailed(format!("HTTP {status}")));
        }
        let reply: LoginReply = resp.json().await.map_err(transport)?;
        Ok(reply.token)
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct AccountRecord {
    id: i64,
    email: String,
    password: String,
    role: String,
}

impl AccountRecord {
    fn to_domain(self) -> SchoolAccount {
        SchoolAccount {
            id: self.id,
            email: self.email,
            password: self.password,
            role: self.role,
        }
    }
}

#[derive(Deserialize)]
struct SchoolRecord {
    id: String,
    name: String,
    director: String,
    #[serde(default)]
    class_count: i64,
    #[serde(default)]
    student_count: i64,
    user_id: i64,
    #[serde(default)]
    user: Option<AccountRecord>,
    #[serde(default)]
    created_at: String,
}

impl SchoolRecord {
    fn to_domain(self) -> School {
        School {
            id: self.id,
            name: self.name,
            director: self.director,
            class_count: self.class_count,
            student_count: self.student_count,
            user_id: self.user_id,
            account: self.user.map(AccountRecord::to_domain),
            created_at: self.created_at,
        }
    }
}

#[derive(Deserialize)]
struct ClassRecord {
    id: String,
    name: String,
    grade: i64,
    #[serde(default)]
    academic_year: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl ClassRecord {
    fn to_domain(self) -> Class {
        Class {
            id: self.id,
            name: self.name,
            grade: self.grade,
            academic_year: self.academic_year,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct StudentRecord {
    id: i64,
    full_name: String,
    class_id: i64,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    school_id: Option<i64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            id: self.id,
            full_name: self.full_name,
            class_id: self.class_id,
            address: self.address,
            birth_date: self.birth_date,
            gender: self.gender,
            note: self.note,
            phone: self.phone,
            school_id: self.school_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Deserialize)]
struct TeacherRecord {
    id: i64,
    full_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    education: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    ped_experience: Option<i64>,
    #[serde(default)]
    total_experience: Option<i64>,
    #[serde(default)]
    work_start: Option<String>,
    #[serde(default)]
    created_at: String,
}

impl TeacherRecord {
    fn to_domain(self) -> Teacher {
        Teacher {
            id: self.id,
            full_name: self.full_name,
            phone: self.phone,
            position: self.position,
            subject: self.subject,
            category: self.category,
            education: self.education,
            note: self.note,
            ped_experience: self.ped_experience,
            total_experience: self.total_experience,
            work_start: self.work_start,
            created_at: self.created_at,
        }
    }
}

#[derive(Deserialize)]
struct SummaryRecord {
    #[serde(default)]
    students: i64,
    #[serde(default)]
    teachers: i64,
    #[serde(default)]
    classes: i64,
    #[serde(default)]
    schools: i64,
}

#[derive(Deserialize)]
struct ImportRecord {
    imported: u64,
}

//=========================================================================================
// Outbound Bodies
//=========================================================================================

#[derive(Serialize)]
struct NewSchoolBody<'a> {
    director: &'a str,
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct SchoolPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    director: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Serialize)]
struct ClassBody<'a> {
    name: &'a str,
    grade: i64,
}

#[derive(Serialize)]
struct NewStudentBody<'a> {
    full_name: &'a str,
    class_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    school_id: Option<i64>,
}

#[derive(Serialize)]
struct StudentPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct TeacherBody<'a> {
    full_name: &'a str,
    phone: &'a str,
    position: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    education: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ped_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    work_start: Option<&'a str>,
}

impl<'a> TeacherBody<'a> {
    fn from_form(form: &'a TeacherForm) -> Self {
        Self {
            full_name: &form.full_name,
            phone: &form.phone,
            position: &form.position,
            subject: &form.subject,
            category: form.category.as_deref(),
            education: form.education.as_deref(),
            note: form.note.as_deref(),
            ped_experience: form.ped_experience,
            total_experience: form.total_experience,
            work_start: form.work_start.as_deref(),
        }
    }
}

//=========================================================================================
// Collection Ports
//=========================================================================================

#[async_trait]
impl CollectionApi<School> for RestClient {
    async fn list(&self, token: &str, _filters: &NoFilters) -> PortResult<Vec<School>> {
        let records: Vec<SchoolRecord> = self.get_json("/roo/schools", token, &[]).await?;
        Ok(records.into_iter().map(SchoolRecord::to_domain).collect())
    }

    async fn create(&self, token: &str, data: &NewSchool) -> PortResult<School> {
        let body = NewSchoolBody {
            director: &data.director,
            email: &data.email,
            name: &data.name,
        };
        let record: SchoolRecord = self
            .post_json("/roo/register_school", token, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn update(&self, token: &str, id: &String, data: &SchoolPatch) -> PortResult<School> {
        let body = SchoolPatchBody {
            name: data.name.as_deref(),
            director: data.director.as_deref(),
            email: data.email.as_deref(),
        };
        let record: SchoolRecord = self
            .put_json(&format!("/roo/schools/{id}"), token, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn delete(&self, token: &str, id: &String) -> PortResult<()> {
        self.delete_at(&format!("/roo/schools/{id}"), token).await
    }
}

#[async_trait]
impl CollectionApi<Class> for RestClient {
    async fn list(&self, token: &str, _filters: &NoFilters) -> PortResult<Vec<Class>> {
        let records: Vec<ClassRecord> = self.get_json("/classes", token, &[]).await?;
        Ok(records.into_iter().map(ClassRecord::to_domain).collect())
    }

    async fn create(&self, token: &str, data: &NewClass) -> PortResult<Class> {
        let body = ClassBody {
            name: &data.name,
            grade: data.grade,
        };
        let record: ClassRecord = self.post_json("/classes", token, &body).await?;
        Ok(record.to_domain())
    }

    async fn update(&self, token: &str, id: &String, data: &NewClass) -> PortResult<Class> {
        let body = ClassBody {
            name: &data.name,
            grade: data.grade,
        };
        let record: ClassRecord = self
            .put_json(&format!("/classes/{id}"), token, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn delete(&self, token: &str, id: &String) -> PortResult<()> {
        self.delete_at(&format!("/classes/{id}"), token).await
    }
}

#[async_trait]
impl CollectionApi<Student> for RestClient {
    async fn list(&self, token: &str, filters: &StudentFilters) -> PortResult<Vec<Student>> {
        let query = filters.query_pairs();
        let records: Vec<StudentRecord> = self.get_json("/students", token, &query).await?;
        Ok(records.into_iter().map(StudentRecord::to_domain).collect())
    }

    async fn create(&self, token: &str, data: &NewStudent) -> PortResult<Student> {
        let body = NewStudentBody {
            full_name: &data.full_name,
            class_id: data.class_id,
            address: data.address.as_deref(),
            birth_date: data.birth_date.as_deref(),
            gender: data.gender.as_deref(),
            note: data.note.as_deref(),
            phone: data.phone.as_deref(),
            school_id: data.school_id,
        };
        let record: StudentRecord = self.post_json("/students", token, &body).await?;
        Ok(record.to_domain())
    }

    async fn update(&self, token: &str, id: &i64, data: &StudentPatch) -> PortResult<Student> {
        let body = StudentPatchBody {
            full_name: data.full_name.as_deref(),
            class_id: data.class_id,
            address: data.address.as_deref(),
            birth_date: data.birth_date.as_deref(),
            gender: data.gender.as_deref(),
            note: data.note.as_deref(),
            phone: data.phone.as_deref(),
        };
        let record: StudentRecord = self
            .put_json(&format!("/students/{id}"), token, &body)
            .await?;
        Ok(record.to_domain())
    }

    async fn delete(&self, token: &str, id: &i64) -> PortResult<()> {
        self.delete_at(&format!("/students/{id}"), token).await
    }
}

#[async_trait]
impl CollectionApi<Teacher> for RestClient {
    async fn list(&self, token: &str, _filters: &NoFilters) -> PortResult<Vec<Teacher>> {
        let records: Vec<TeacherRecord> = self.get_json("/staff", token, &[]).await?;
        Ok(records.into_iter().map(TeacherRecord::to_domain).collect())
    }

    async fn create(&self, token: &str, data: &TeacherForm) -> PortResult<Teacher> {
        let record: TeacherRecord = self
            .post_json("/staff", token, &TeacherBody::from_form(data))
            .await?;
        Ok(record.to_domain())
    }

    async fn update(&self, token: &str, id: &i64, data: &TeacherForm) -> PortResult<Teacher> {
        let record: TeacherRecord = self
            .put_json(&format!("/staff/{id}"), token, &TeacherBody::from_form(data))
            .await?;
        Ok(record.to_domain())
    }

    async fn delete(&self, token: &str, id: &i64) -> PortResult<()> {
        self.delete_at(&format!("/staff/{id}"), token).await
    }
}

//=========================================================================================
// Reports Port
//=========================================================================================

#[async_trait]
impl ReportsApi for RestClient {
    async fn summary(&self, token: &str) -> PortResult<Summary> {
        let record: SummaryRecord = self.get_json("/summary", token, &[]).await?;
        Ok(Summary {
            students: record.students,
            teachers: record.teachers,
            classes: record.classes,
            schools: record.schools,
        })
    }

    async fn import_students(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<ImportReport> {
        self.post_spreadsheet("/students/import", token, file_name, bytes)
            .await
    }

    async fn import_staff(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<ImportReport> {
        self.post_spreadsheet("/staff/import", token, file_name, bytes)
            .await
    }

    async fn student_template(&self, token: &str) -> PortResult<Vec<u8>> {
        self.get_bytes("/students/import/template", token).await
    }

    async fn staff_template(&self, token: &str) -> PortResult<Vec<u8>> {
        self.get_bytes("/staff/import/template", token).await
    }
}
