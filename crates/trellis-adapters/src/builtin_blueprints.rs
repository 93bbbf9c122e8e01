//! Blueprints that ship with Trellis.
//!
//! The Rails blueprint is an explicit, ordered list of step groups. Each
//! group shares one guard; step order inside a group is significant (a
//! `remove-file` always precedes the write that replaces it).
//!
//! Its template files are compiled into the binary ([`RAILS_FILES`]) and
//! served by [`EmbeddedTemplateSource::rails`](crate::EmbeddedTemplateSource::rails).
//! The same layout can be read from disk with `DirectoryTemplateSource`.

use trellis_core::{
    domain::{
        Blueprint, CommandLine, Feature, Guard, Pipeline, TemplateId, TextSource, ValidationRule,
    },
    error::TrellisResult,
};

/// Identifier of the built-in Rails blueprint.
pub const RAILS_ID: &str = "rails@1.0.0";

/// Appended once to `config/boot.rb` so the app loads its env-var config.
const BOOT_CONFIGURATION: &str = r#"
# Load configuration
require "env_vars/dotenv"
require File.expand_path("../config", __FILE__)
"#;

macro_rules! rails_file {
    ($path:literal) => {
        (
            $path,
            include_bytes!(concat!("../templates/rails/", $path)) as &[u8],
            false,
        )
    };
    ($path:literal, executable) => {
        (
            $path,
            include_bytes!(concat!("../templates/rails/", $path)) as &[u8],
            true,
        )
    };
}

/// `(path, contents, executable)` for every Rails template file.
pub static RAILS_FILES: &[(&str, &[u8], bool)] = &[
    rails_file!("base/Rakefile"),
    rails_file!("base/config.ru"),
    rails_file!("base/bin/setup", executable),
    rails_file!("base/config/boot.rb"),
    rails_file!("base/config/environment.rb"),
    rails_file!("base/config/locales/en.yml"),
    rails_file!("base/app/controllers/application_controller.rb"),
    rails_file!("base/app/assets/config/manifest.js"),
    rails_file!("Gemfile.j2"),
    rails_file!(".eslintrc"),
    rails_file!(".editorconfig"),
    rails_file!(".rubocop.yml"),
    rails_file!(".env.development.j2"),
    rails_file!(".env.test.j2"),
    rails_file!("gitignore"),
    rails_file!("app/controllers/pages_controller.rb"),
    rails_file!("app/controllers/concerns/assets.rb"),
    rails_file!("app/views/pages/home.html.erb"),
    rails_file!("app/views/layouts/application.html.erb.j2"),
    rails_file!("app/assets/javascripts/application.js"),
    rails_file!("app/assets/javascripts/application/boot.es6"),
    rails_file!("app/assets/javascripts/application/controllers/pages/home.es6"),
    rails_file!("app/assets/javascripts/cable.js"),
    rails_file!("config/application.rb.j2"),
    rails_file!("config/routes.rb.j2"),
    rails_file!("config/config.rb.j2"),
    rails_file!("config/database.yml.j2"),
    rails_file!("config/initializers/babel.rb.j2"),
    rails_file!("config/initializers/generators.rb.j2"),
    rails_file!("config/initializers/localization.rb.j2"),
    rails_file!("config/initializers/secure_headers.rb"),
    rails_file!("test/test_helper.rb"),
    rails_file!("test/support/minitest.rb"),
];

/// The Rails application blueprint.
pub fn rails_blueprint() -> TrellisResult<Blueprint> {
    let blueprint = Blueprint::builder()
        .id(TemplateId::parse(RAILS_ID)?)
        .description("Rails application with env-var config, ES6 assets and secure headers")
        .rule(ValidationRule::implies(
            "action_cable_requires_javascript",
            Feature::SkipJavascript,
            Feature::SkipActionCable,
            "the Action Cable client lives in the JavaScript asset tree; \
             pass skip_action_cable together with skip_javascript",
        ))
        .rule(ValidationRule::excludes(
            "edge_excludes_dev",
            Feature::Edge,
            Feature::Dev,
            "edge and dev select different Rails sources; choose one",
        ))
        .pipeline(rails_pipeline()?)
        .build()?;
    Ok(blueprint)
}

fn rails_pipeline() -> TrellisResult<Pipeline> {
    let pipeline = Pipeline::builder()
        .group("create_app_skeleton", Guard::Always, |g| {
            g.copy_directory("base", ".")
                .render("config/application.rb.j2", "config/application.rb")
                .create_empty_file("log/.keep")
                .create_empty_file("tmp/.keep")
        })
        .group("copy_gemfile", Guard::Always, |g| {
            g.remove_file("Gemfile").render("Gemfile.j2", "Gemfile")
        })
        .group("copy_sample_files", Guard::Always, |g| {
            g.copy_file("app/controllers/pages_controller.rb")
                .copy_file("app/views/pages/home.html.erb")
                .copy_file("app/assets/javascripts/application/controllers/pages/home.es6")
                .copy_file("app/controllers/concerns/assets.rb")
        })
        .group("copy_rc_files", Guard::Always, |g| {
            g.copy_file(".eslintrc")
                .copy_file(".editorconfig")
                .copy_file(".rubocop.yml")
        })
        .group("copy_routes", Guard::Always, |g| {
            g.remove_file("config/routes.rb")
                .render("config/routes.rb.j2", "config/routes.rb")
        })
        .group(
            "configure_javascript",
            Guard::Unless(Feature::SkipJavascript),
            |g| {
                g.render(
                    "config/initializers/babel.rb.j2",
                    "config/initializers/babel.rb",
                )
                .remove_file("app/assets/javascripts/application.js")
                .copy_file("app/assets/javascripts/application.js")
                .copy_file("app/assets/javascripts/application/boot.es6")
                .create_empty_file("app/assets/javascripts/application/routes/.keep")
            },
        )
        .group(
            "configure_action_cable",
            Guard::Unless(Feature::SkipActionCable),
            |g| g.copy_file("app/assets/javascripts/cable.js"),
        )
        .group("configure_env", Guard::Always, |g| {
            g.render(".env.development.j2", ".env.development")
                .render(".env.test.j2", ".env.test")
                .render("config/config.rb.j2", "config/config.rb")
                .append(
                    "config/boot.rb",
                    TextSource::Literal(BOOT_CONFIGURATION.to_string()),
                )
        })
        .group(
            "configure_database",
            Guard::Unless(Feature::SkipActiveRecord),
            |g| {
                g.remove_file("config/database.yml")
                    .render("config/database.yml.j2", "config/database.yml")
            },
        )
        .group("configure_test", Guard::Unless(Feature::SkipTestUnit), |g| {
            g.remove_file("test/test_helper.rb")
                .copy_file("test/test_helper.rb")
                .copy_file("test/support/minitest.rb")
        })
        .group("configure_generators", Guard::Always, |g| {
            g.render(
                "config/initializers/generators.rb.j2",
                "config/initializers/generators.rb",
            )
        })
        .group("configure_localization", Guard::Always, |g| {
            g.render(
                "config/initializers/localization.rb.j2",
                "config/initializers/localization.rb",
            )
        })
        .group("configure_gitignore", Guard::Always, |g| {
            g.remove_file(".gitignore").copy_file_to("gitignore", ".gitignore")
        })
        .group("configure_layout", Guard::Always, |g| {
            g.remove_file("app/views/layouts/application.html.erb").render(
                "app/views/layouts/application.html.erb.j2",
                "app/views/layouts/application.html.erb",
            )
        })
        .group("configure_secure_headers", Guard::Always, |g| {
            g.copy_file("config/initializers/secure_headers.rb")
        })
        .group("install_dependencies", Guard::Always, |g| {
            g.run(CommandLine::new("bundle").arg("install"), ".")
        })
        .build()?;
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmbeddedTemplateSource;
    use trellis_core::{
        application::TemplateSource,
        domain::{Operation, RawOptions, RelativePath},
    };

    #[test]
    fn every_referenced_template_is_embedded() {
        let blueprint = rails_blueprint().unwrap();
        let source = EmbeddedTemplateSource::rails();

        for step in blueprint.pipeline().steps() {
            match step.operation() {
                Operation::CopyFile { source: path, .. }
                | Operation::RenderTemplate { source: path, .. } => {
                    assert!(
                        source.read(path).unwrap().is_some(),
                        "{} references missing {}",
                        step.name(),
                        path
                    );
                }
                Operation::CopyDirectory { source: dir, .. } => {
                    assert!(!source.list(dir).unwrap().is_empty());
                }
                _ => {}
            }
        }
    }

    #[test]
    fn embedded_table_matches_the_blueprint() {
        let source = EmbeddedTemplateSource::rails();
        assert_eq!(source.len(), RAILS_FILES.len());
        assert!(
            source
                .read(&RelativePath::new("config/database.yml.j2"))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn steps_are_named_by_group_and_operation() {
        let blueprint = rails_blueprint().unwrap();
        let names: Vec<&str> = blueprint
            .pipeline()
            .steps()
            .iter()
            .map(|s| s.name())
            .collect();

        assert_eq!(names.first(), Some(&"create_app_skeleton: copy-directory ."));
        assert!(names.contains(&"configure_database: render-template config/database.yml"));
        assert_eq!(
            names.last(),
            Some(&"install_dependencies: run-command `bundle install` in .")
        );
    }

    #[test]
    fn remove_precedes_replacement() {
        let blueprint = rails_blueprint().unwrap();
        let steps = blueprint.pipeline().steps();
        let position = |name: &str| steps.iter().position(|s| s.name() == name).unwrap();

        assert!(
            position("copy_gemfile: remove-file Gemfile")
                < position("copy_gemfile: render-template Gemfile")
        );
        assert!(
            position("create_app_skeleton: copy-directory .")
                < position("configure_env: append-text config/boot.rb")
        );
    }

    #[test]
    fn blueprint_rules_follow_builtin_rules() {
        let blueprint = rails_blueprint().unwrap();
        let resolver = blueprint.resolver();
        let names: Vec<&str> = resolver.rules().iter().map(|r| r.name()).collect();

        assert_eq!(
            &names[names.len() - 2..],
            &["action_cable_requires_javascript", "edge_excludes_dev"]
        );
    }

    #[test]
    fn javascript_without_cable_is_rejected() {
        let blueprint = rails_blueprint().unwrap();
        let raw = RawOptions::new()
            .with("app_name", "acme")
            .with("database", "sqlite3")
            .with("skip_javascript", true);

        let err = blueprint.resolver().resolve(&raw).unwrap_err();
        assert_eq!(err.option(), Some("skip_action_cable"));
    }

    #[test]
    fn edge_and_dev_are_exclusive() {
        let blueprint = rails_blueprint().unwrap();
        let raw = RawOptions::new()
            .with("app_name", "acme")
            .with("database", "sqlite3")
            .with("edge", true)
            .with("dev", true);

        assert!(blueprint.resolver().resolve(&raw).is_err());
    }
}
