//! CodeBuild implementation of the [`BuildStarter`] port.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codebuild::types::{EnvironmentVariable, EnvironmentVariableType};
use relay::errors::DeliveryError;
use relay::identifiers::BuildArn;
use relay::ports::{BuildStarter, StartBuildRequest, StartedBuild};

/// Starts builds through CodeBuild.
#[derive(Debug, Clone)]
pub struct CodeBuildStarter {
    client: aws_sdk_codebuild::Client,
}

impl CodeBuildStarter {
    /// Creates a starter from the shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_codebuild::Client::new(config),
        }
    }
}

fn codebuild_error(message: impl std::fmt::Display) -> DeliveryError {
    DeliveryError::Api {
        sink: "codebuild".to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl BuildStarter for CodeBuildStarter {
    async fn start_build(
        &self,
        request: &StartBuildRequest,
    ) -> Result<StartedBuild, DeliveryError> {
        let mut call = self
            .client
            .start_build()
            .project_name(request.project_name.as_str());

        if let Some(version) = &request.source_version {
            call = call.source_version(version.as_str());
        }
        if let Some(buildspec) = &request.buildspec_override {
            call = call.buildspec_override(buildspec.as_str());
        }
        for variable in &request.environment_overrides {
            let variable = EnvironmentVariable::builder()
                .name(variable.name.clone())
                .value(variable.value.clone())
                .r#type(EnvironmentVariableType::Plaintext)
                .build()
                .map_err(codebuild_error)?;
            call = call.environment_variables_override(variable);
        }

        tracing::debug!(project = %request.project_name, "starting CodeBuild build");
        let output = call.send().await.map_err(codebuild_error)?;
        let build_arn = output
            .build_value()
            .and_then(|build| build.arn())
            .and_then(|arn| BuildArn::new(arn));
        Ok(StartedBuild { build_arn })
    }
}
