//! gRPC endpoint: both entity services plus reflection on one listener.

use crate::{
    convert::RegisterDefaults,
    data::{student::Student, teacher::Teacher},
    error::{ReflectionSnafu, RosterResult, TransportSnafu},
    pb::{
        self,
        student_service_server::{StudentService, StudentServiceServer},
        teacher_service_server::{TeacherService, TeacherServiceServer},
    },
    service::{EntityService, Outcome},
    state::RosterState,
};
use snafu::ResultExt;
use std::future::Future;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status, transport::Server};

/// Wraps an [`EntityService`] and implements one generated service trait for it.
macro_rules! entity_rpc {
    ($rpc:ident, $service_trait:ident, $record:ty, $wire:ty, $list:ident, $field:ident) => {
        #[derive(Clone)]
        pub struct $rpc(pub EntityService<$record>);

        #[tonic::async_trait]
        impl $service_trait for $rpc {
            async fn get(&self, request: Request<pb::Request>) -> Result<Response<$wire>, Status> {
                let id = request.into_inner().id;
                let record = self.0.get(id).await?;
                Ok(Response::new(record.into()))
            }

            async fn get_all(
                &self,
                _request: Request<pb::Request>,
            ) -> Result<Response<pb::$list>, Status> {
                let records = self.0.get_all().await?;
                Ok(Response::new(pb::$list {
                    $field: records.into_iter().map(Into::into).collect(),
                }))
            }

            async fn register(
                &self,
                request: Request<$wire>,
            ) -> Result<Response<pb::Response>, Status> {
                let wire = request.into_inner().with_register_defaults();
                let outcome = match <$record>::try_from(wire) {
                    Ok(record) => self.0.register(record).await,
                    Err(e) => {
                        warn!(?e, "rejecting register");
                        Outcome::rejected(&e)
                    }
                };
                Ok(Response::new(outcome.into()))
            }

            async fn edit(
                &self,
                request: Request<$wire>,
            ) -> Result<Response<pb::Response>, Status> {
                let outcome = match <$record>::try_from(request.into_inner()) {
                    Ok(record) => self.0.edit(record).await,
                    Err(e) => {
                        warn!(?e, "rejecting edit");
                        Outcome::rejected(&e)
                    }
                };
                Ok(Response::new(outcome.into()))
            }

            async fn remove(
                &self,
                request: Request<pb::Request>,
            ) -> Result<Response<pb::Response>, Status> {
                let outcome = self.0.remove(request.into_inner().id).await;
                Ok(Response::new(outcome.into()))
            }
        }
    };
}

entity_rpc!(StudentRpc, StudentService, Student, pb::Student, Students, students);
entity_rpc!(TeacherRpc, TeacherService, Teacher, pb::Teacher, Teachers, teachers);

/// Serves both services (and reflection) until `shutdown` resolves.
pub async fn serve<F>(state: RosterState, listener: TcpListener, shutdown: F) -> RosterResult<()>
where
    F: Future<Output = ()> + Send,
{
    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(pb::FILE_DESCRIPTOR_SET)
        .build_v1()
        .context(ReflectionSnafu)?;

    let students = StudentRpc(EntityService::new(state.clone()));
    let teachers = TeacherRpc(EntityService::new(state));

    Server::builder()
        .trace_fn(|request| info_span!("rpc", path = %request.uri().path()))
        .add_service(StudentServiceServer::new(students))
        .add_service(TeacherServiceServer::new(teachers))
        .add_service(reflection)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
        .context(TransportSnafu)
}
