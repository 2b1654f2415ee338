//! Deployer command-line construction.
//!
//! Pure functions from an [`InvocationParameters`] bundle to the exact
//! argument vector handed to the process runner. No I/O happens here;
//! identical parameters always yield an identical vector.

use crate::error::{Error, Result};
use crate::task::StageMode;

use super::params::{InvocationParameters, Operation};

/// Builds the argument vector for a deploy or undeploy operation.
///
/// The bundle's `operation` must be set; the source path is required for
/// deploy and ignored for undeploy.
pub fn operation_command_line(params: &InvocationParameters) -> Result<Vec<String>> {
    let operation = params
        .operation
        .ok_or_else(|| Error::InvalidCommandLine("no operation selected".to_string()))?;

    let mut argv = launcher_prefix(params)?;
    push_admin_args(&mut argv, params);
    argv.push(operation.flag().to_string());
    argv.push("-name".to_string());
    argv.push(params.deployment_name.clone());

    if operation == Operation::Deploy {
        let source = params.source_path.as_ref().ok_or_else(|| {
            Error::InvalidCommandLine("deploy operation without a source path".to_string())
        })?;
        argv.push("-source".to_string());
        argv.push(source.clone());
    }

    argv.push("-targets".to_string());
    argv.push(params.targets.clone());

    match params.stage_mode {
        StageMode::Stage => argv.push("-stage".to_string()),
        StageMode::NoStage => argv.push("-nostage".to_string()),
        StageMode::ByDefault => {}
    }

    if operation == Operation::Deploy {
        if let Some(plan) = &params.deployment_plan {
            argv.push("-plan".to_string());
            argv.push(plan.to_string_lossy().to_string());
        }
    }

    if params.library {
        argv.push("-library".to_string());
    }
    if params.no_exit_wait {
        argv.push("-noexit".to_string());
    }

    Ok(argv)
}

/// Wraps an already-token-resolved custom command into an invocable form.
///
/// The raw text is split into words without any further interpretation and
/// appended after the launcher prefix.
pub fn custom_command_line(params: &InvocationParameters, raw: &str) -> Result<Vec<String>> {
    let mut argv = launcher_prefix(params)?;
    let words = shell_words::split(raw)
        .map_err(|e| Error::InvalidCommandLine(format!("'{raw}': {e}")))?;
    argv.extend(words);
    Ok(argv)
}

/// Shared prefix of every deployer invocation: launcher, JVM options,
/// classpath and the deployer main class.
fn launcher_prefix(params: &InvocationParameters) -> Result<Vec<String>> {
    if params.deployer_class.trim().is_empty() {
        return Err(Error::InvalidCommandLine(
            "deployer class is not configured".to_string(),
        ));
    }

    let mut argv = vec![params.toolchain.launcher().to_string_lossy().to_string()];

    if let Some(opts) = params.java_opts.as_deref().filter(|o| !o.trim().is_empty()) {
        let words = shell_words::split(opts)
            .map_err(|e| Error::InvalidCommandLine(format!("JVM options '{opts}': {e}")))?;
        argv.extend(words);
    }

    if !params.extra_classpath.is_empty() {
        let classpath = params
            .extra_classpath
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(":");
        argv.push("-cp".to_string());
        argv.push(classpath);
    }

    argv.push(params.deployer_class.clone());
    Ok(argv)
}

fn push_admin_args(argv: &mut Vec<String>, params: &InvocationParameters) {
    argv.push("-adminurl".to_string());
    argv.push(params.admin_url());
    if let Some(user) = &params.environment.user {
        argv.push("-username".to_string());
        argv.push(user.clone());
    }
    if let Some(password) = &params.environment.password {
        argv.push("-password".to_string());
        argv.push(password.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetEnvironment;
    use crate::task::Task;
    use crate::toolchain::Toolchain;
    use std::path::PathBuf;

    fn environment() -> TargetEnvironment {
        TargetEnvironment {
            name: "prod".to_string(),
            host: "app-01.example.net".to_string(),
            port: 7001,
            protocol: Some("t3".to_string()),
            user: Some("admin".to_string()),
            password: Some("secret".to_string()),
            transfer_host: None,
            transfer_user: None,
            transfer_password: None,
            remote_dir: Some("/opt/lib".to_string()),
        }
    }

    fn params() -> InvocationParameters {
        let task = Task {
            id: "1".to_string(),
            name: "frontend".to_string(),
            artifact_pattern: ".*\\.war".to_string(),
            artifact_dir: PathBuf::from("target"),
            environment: "prod".to_string(),
            deployment_name: "frontend".to_string(),
            library: false,
            targets: "cluster-a".to_string(),
            stage_mode: StageMode::ByDefault,
            deployment_plan: None,
            protocol: None,
            command_line: None,
        };
        InvocationParameters::base(
            &task,
            &environment(),
            &Toolchain::new("jdk17", "/opt/jdk17"),
            "com.example.Deployer",
            Some("-Xmx512m".to_string()),
            vec![PathBuf::from("/opt/deployer/deployer.jar")],
            "frontend",
        )
    }

    #[test]
    fn test_deploy_command_shape() {
        let params = InvocationParameters {
            operation: Some(Operation::Deploy),
            source_path: Some("/ws/target/frontend.war".to_string()),
            no_exit_wait: false,
            ..params()
        };
        let argv = operation_command_line(&params).unwrap();
        assert_eq!(
            argv,
            vec![
                "/opt/jdk17/bin/java",
                "-Xmx512m",
                "-cp",
                "/opt/deployer/deployer.jar",
                "com.example.Deployer",
                "-adminurl",
                "t3://app-01.example.net:7001",
                "-username",
                "admin",
                "-password",
                "secret",
                "-deploy",
                "-name",
                "frontend",
                "-source",
                "/ws/target/frontend.war",
                "-targets",
                "cluster-a",
            ]
        );
    }

    #[test]
    fn test_undeploy_command_has_no_source_and_waives_exit() {
        let params = InvocationParameters {
            operation: Some(Operation::Undeploy),
            ..params()
        };
        let argv = operation_command_line(&params).unwrap();
        assert!(argv.contains(&"-undeploy".to_string()));
        assert!(!argv.contains(&"-source".to_string()));
        assert_eq!(argv.last().unwrap(), "-noexit");
    }

    #[test]
    fn test_stage_modes() {
        let base = InvocationParameters {
            operation: Some(Operation::Deploy),
            source_path: Some("/ws/frontend.war".to_string()),
            ..params()
        };
        let stage = InvocationParameters {
            stage_mode: StageMode::Stage,
            ..base.clone()
        };
        assert!(operation_command_line(&stage).unwrap().contains(&"-stage".to_string()));
        let nostage = InvocationParameters {
            stage_mode: StageMode::NoStage,
            ..base.clone()
        };
        assert!(operation_command_line(&nostage)
            .unwrap()
            .contains(&"-nostage".to_string()));
        let argv = operation_command_line(&base).unwrap();
        assert!(!argv.contains(&"-stage".to_string()));
        assert!(!argv.contains(&"-nostage".to_string()));
    }

    #[test]
    fn test_library_flag_and_plan() {
        let params = InvocationParameters {
            operation: Some(Operation::Deploy),
            source_path: Some("/opt/lib/shared.jar".to_string()),
            library: true,
            deployment_plan: Some(PathBuf::from("/ws/plan.xml")),
            ..params()
        };
        let argv = operation_command_line(&params).unwrap();
        assert!(argv.contains(&"-library".to_string()));
        let plan_pos = argv.iter().position(|a| a == "-plan").unwrap();
        assert_eq!(argv[plan_pos + 1], "/ws/plan.xml");
    }

    #[test]
    fn test_credentials_are_optional() {
        let mut p = params();
        p.environment.user = None;
        p.environment.password = None;
        p.operation = Some(Operation::Undeploy);
        let argv = operation_command_line(&p).unwrap();
        assert!(!argv.contains(&"-username".to_string()));
        assert!(!argv.contains(&"-password".to_string()));
    }

    #[test]
    fn test_deploy_without_source_is_rejected() {
        let p = InvocationParameters {
            operation: Some(Operation::Deploy),
            ..params()
        };
        assert!(matches!(
            operation_command_line(&p).unwrap_err(),
            Error::InvalidCommandLine(_)
        ));
    }

    #[test]
    fn test_custom_command_wraps_raw_text() {
        let argv = custom_command_line(&params(), "-listapps -adminurl t3://h:1").unwrap();
        assert_eq!(
            argv,
            vec![
                "/opt/jdk17/bin/java",
                "-Xmx512m",
                "-cp",
                "/opt/deployer/deployer.jar",
                "com.example.Deployer",
                "-listapps",
                "-adminurl",
                "t3://h:1",
            ]
        );
    }

    #[test]
    fn test_builder_is_deterministic() {
        let p = InvocationParameters {
            operation: Some(Operation::Deploy),
            source_path: Some("/ws/frontend.war".to_string()),
            ..params()
        };
        assert_eq!(
            operation_command_line(&p).unwrap(),
            operation_command_line(&p).unwrap()
        );
    }

    #[test]
    fn test_missing_deployer_class_is_rejected() {
        let mut p = params();
        p.deployer_class = String::new();
        p.operation = Some(Operation::Undeploy);
        assert!(matches!(
            operation_command_line(&p).unwrap_err(),
            Error::InvalidCommandLine(_)
        ));
    }
}
