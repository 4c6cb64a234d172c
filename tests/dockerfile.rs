const DOCKERFILE: &str = include_str!("../Dockerfile");

fn position(needle: &str) -> usize {
    DOCKERFILE
        .find(needle)
        .unwrap_or_else(|| panic!("Dockerfile is missing {:?}", needle))
}

#[test]
fn dependencies_are_installed_before_sources_are_copied() {
    let manifest = position("COPY Cargo.toml");
    let fetch = position("cargo fetch");
    let sources = position("COPY src ./src");
    let build = DOCKERFILE.rfind("cargo build --release").unwrap();

    assert!(manifest < fetch);
    assert!(fetch < sources);
    assert!(sources < build);
}

#[test]
fn runtime_environment_matches_deployment_contract() {
    assert!(DOCKERFILE.contains("PORT=5000"));
    assert!(DOCKERFILE.contains("EXPOSE 5000"));
    assert!(DOCKERFILE.contains("WORKDIR /app"));

    let arg = position("ARG YOUTUBE_API_KEY");
    let env = position("ENV YOUTUBE_API_KEY=${YOUTUBE_API_KEY}");
    assert!(arg < env);
}

#[test]
fn entry_command_runs_the_server_through_a_shell() {
    let cmd = DOCKERFILE
        .lines()
        .rev()
        .find(|line| line.starts_with("CMD"))
        .unwrap();
    assert_eq!(cmd.trim(), "CMD ytcrawl serve");
}
