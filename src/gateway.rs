//! HTTP front door. Parses path ids and form fields, calls the RPC server, and
//! relays whatever it says as JSON.
//!
//! An RPC that completes is always HTTP 200, even when the embedded
//! `Response.code` reports a failed write. Only RPC errors change the HTTP status.

use crate::{
    convert::instant_to_timestamp,
    error::{
        InvalidEndpointSnafu, MissingTimestampSnafu, ParseIdSnafu, ParseTimeSnafu, RosterError,
        RosterResult, RpcSnafu,
    },
    pb::{
        self, student_service_client::StudentServiceClient,
        teacher_service_client::TeacherServiceClient,
    },
};
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use prost_types::Timestamp;
use serde::{Deserialize, Serialize, Serializer};
use snafu::{ResultExt, ensure};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tonic::transport::{Channel, Endpoint};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug)]
pub struct GatewayState {
    students: StudentServiceClient<Channel>,
    teachers: TeacherServiceClient<Channel>,
}

impl GatewayState {
    pub fn new(channel: Channel) -> Self {
        Self {
            students: StudentServiceClient::new(channel.clone()),
            teachers: TeacherServiceClient::new(channel),
        }
    }

    /// Builds a channel that dials on first use, so the gateway can start before the server.
    pub fn connect_lazy(rpc_url: &str) -> RosterResult<Self> {
        let endpoint = Endpoint::from_shared(rpc_url.to_string()).context(InvalidEndpointSnafu {
            original: rpc_url.to_string(),
        })?;
        Ok(Self::new(endpoint.connect_lazy()))
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/student/{id}", get(get_student))
        .route("/students/all", get(get_all_students))
        .route("/student/register", post(register_student))
        .route("/student/edit/{id}", put(edit_student))
        .route("/student/delete/{id}", delete(remove_student))
        .route("/teacher/{id}", get(get_teacher))
        .route("/teachers/all", get(get_all_teachers))
        .route("/teacher/register", post(register_teacher))
        .route("/teacher/edit/{id}", put(edit_teacher))
        .route("/teacher/delete/{id}", delete(remove_teacher))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_id(raw: &str) -> RosterResult<i32> {
    raw.parse().context(ParseIdSnafu { original: raw })
}

fn parse_timestamp(raw: &str) -> RosterResult<Timestamp> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).context(ParseTimeSnafu { original: raw })?;
    Ok(instant_to_timestamp(parsed))
}

#[allow(clippy::ref_option)]
fn serialize_timestamp<S: Serializer>(
    ts: &Option<Timestamp>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::Error;

    let Some(ts) = ts else {
        return serializer.serialize_none();
    };
    let instant = OffsetDateTime::from_unix_timestamp(ts.seconds).map_err(S::Error::custom)?;
    let formatted = instant.format(&Rfc3339).map_err(S::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub course_id: String,
}

impl StudentForm {
    pub fn into_wire(self, id: i32) -> RosterResult<pb::Student> {
        Ok(pb::Student {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            dob: Some(parse_timestamp(&self.dob)?),
            course: Some(pb::Course {
                id: parse_id(&self.course_id)?,
            }),
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct TeacherForm {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub joined_date: String,
}

impl TeacherForm {
    /// An empty `joined_date` is left unset for the server to fill in on register.
    pub fn into_wire(self, id: i32) -> RosterResult<pb::Teacher> {
        let joined_date = if self.joined_date.is_empty() {
            None
        } else {
            Some(parse_timestamp(&self.joined_date)?)
        };

        Ok(pb::Teacher {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            dob: Some(parse_timestamp(&self.dob)?),
            joined_date,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct CourseJson {
    pub id: i32,
}

#[derive(Serialize, Debug)]
pub struct StudentJson {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub dob: Option<Timestamp>,
    pub course: Option<CourseJson>,
}

impl From<pb::Student> for StudentJson {
    fn from(value: pb::Student) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: value.dob,
            course: value.course.map(|c| CourseJson { id: c.id }),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StudentsJson {
    pub students: Vec<StudentJson>,
}

#[derive(Serialize, Debug)]
pub struct TeacherJson {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub dob: Option<Timestamp>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub joined_date: Option<Timestamp>,
}

impl From<pb::Teacher> for TeacherJson {
    fn from(value: pb::Teacher) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            dob: value.dob,
            joined_date: value.joined_date,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct TeachersJson {
    pub teachers: Vec<TeacherJson>,
}

#[derive(Serialize, Debug)]
pub struct ResponseJson {
    pub message: String,
    pub code: i32,
    pub id: i32,
}

impl From<pb::Response> for ResponseJson {
    fn from(value: pb::Response) -> Self {
        Self {
            message: value.message,
            code: value.code,
            id: value.id,
        }
    }
}

type JsonResult<T> = Result<Json<T>, RosterError>;

pub async fn get_student(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
) -> JsonResult<StudentJson> {
    let request = pb::Request { id: parse_id(&id)? };
    let student = state.students.get(request).await.context(RpcSnafu)?;
    Ok(Json(student.into_inner().into()))
}

pub async fn get_all_students(State(mut state): State<GatewayState>) -> JsonResult<StudentsJson> {
    let students = state
        .students
        .get_all(pb::Request::default())
        .await
        .context(RpcSnafu)?
        .into_inner();
    Ok(Json(StudentsJson {
        students: students.students.into_iter().map(Into::into).collect(),
    }))
}

pub async fn register_student(
    State(mut state): State<GatewayState>,
    Form(form): Form<StudentForm>,
) -> JsonResult<ResponseJson> {
    let student = form.into_wire(0)?;
    let response = state.students.register(student).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}

pub async fn edit_student(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> JsonResult<ResponseJson> {
    let student = form.into_wire(parse_id(&id)?)?;
    let response = state.students.edit(student).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}

pub async fn remove_student(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
) -> JsonResult<ResponseJson> {
    let request = pb::Request { id: parse_id(&id)? };
    let response = state.students.remove(request).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}

pub async fn get_teacher(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
) -> JsonResult<TeacherJson> {
    let request = pb::Request { id: parse_id(&id)? };
    let teacher = state.teachers.get(request).await.context(RpcSnafu)?;
    Ok(Json(teacher.into_inner().into()))
}

pub async fn get_all_teachers(State(mut state): State<GatewayState>) -> JsonResult<TeachersJson> {
    let teachers = state
        .teachers
        .get_all(pb::Request::default())
        .await
        .context(RpcSnafu)?
        .into_inner();
    Ok(Json(TeachersJson {
        teachers: teachers.teachers.into_iter().map(Into::into).collect(),
    }))
}

pub async fn register_teacher(
    State(mut state): State<GatewayState>,
    Form(form): Form<TeacherForm>,
) -> JsonResult<ResponseJson> {
    let teacher = form.into_wire(0)?;
    let response = state.teachers.register(teacher).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}

pub async fn edit_teacher(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
    Form(form): Form<TeacherForm>,
) -> JsonResult<ResponseJson> {
    let id = parse_id(&id)?;
    ensure!(
        !form.joined_date.is_empty(),
        MissingTimestampSnafu {
            field: "joined_date"
        }
    );
    let teacher = form.into_wire(id)?;
    let response = state.teachers.edit(teacher).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}

pub async fn remove_teacher(
    State(mut state): State<GatewayState>,
    Path(id): Path<String>,
) -> JsonResult<ResponseJson> {
    let request = pb::Request { id: parse_id(&id)? };
    let response = state.teachers.remove(request).await.context(RpcSnafu)?;
    Ok(Json(response.into_inner().into()))
}
