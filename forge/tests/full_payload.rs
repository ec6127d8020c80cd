//! End-to-end payload generation, rendered with a real Jinja-compatible
//! engine where the payload only uses constructs that engine shares.

use forge::assembler::{ForgeOptions, PayloadForge};
use forge::core::capability::Capabilities;
use forge::core::goal::{Goal, int};
use forge::core::synth::SynthOptions;
use forge::oracle::Oracle;
use forge::test_support::{permissive, rejecting, rejecting_chars};

fn render(payload: &str) -> String {
    let env = minijinja::Environment::new();
    env.render_str(payload, minijinja::context! {})
        .expect("payload renders")
}

fn generate<O: Oracle>(oracle: O, goal: &Goal) -> String {
    let mut forge = PayloadForge::new(oracle, ForgeOptions::default());
    forge
        .generate(goal)
        .expect("prepared")
        .expect("goal resolves")
        .payload
}

#[test]
fn arithmetic_keeps_grouping() {
    let payload = generate(permissive(), &Goal::product(Goal::sum(int(1), int(2)), int(3)));
    assert_eq!(payload, "{{(1+2)*3}}");
    assert_eq!(render(&payload), "9");

    let payload = generate(permissive(), &Goal::sum(Goal::product(int(2), int(3)), int(1)));
    assert_eq!(payload, "{{2*3+1}}");
    assert_eq!(render(&payload), "7");
}

#[test]
fn nested_modulo_is_parenthesized() {
    let payload = generate(
        permissive(),
        &Goal::modulo(int(17), Goal::modulo(int(10), int(4))),
    );
    assert_eq!(payload, "{{17%(10%4)}}");
    assert_eq!(render(&payload), "1");
}

#[test]
fn negative_integers_render() {
    let payload = generate(permissive(), &int(-5));
    assert_eq!(payload, "{{ -5}}");
    assert_eq!(render(&payload), "-5");
}

#[test]
fn negative_integers_without_digits_keep_their_sign() {
    let no_digits = |text: &str| !text.chars().any(|c| c.is_ascii_digit());
    let positive = render(&generate(no_digits, &int(27)));
    let payload = generate(no_digits, &int(-27));
    assert!(payload.contains("{{ -"), "{payload}");
    assert_eq!(render(&payload), format!("-{positive}"), "{payload}");
}

#[test]
fn quote_fallback_renders_the_string() {
    let payload = generate(rejecting(&["'"]), &Goal::string("ab"));
    assert_eq!(payload, "{{\"ab\"}}");
    assert_eq!(render(&payload), "ab");
}

#[test]
fn string_without_dots_underscores_or_quotes() {
    let oracle = rejecting_chars("._'\"");
    let payload = generate(&oracle, &Goal::string("ab"));
    assert!(payload.starts_with("{{") && payload.ends_with("}}"), "{payload}");
    assert!(oracle(&payload));
    assert_eq!(render(&payload), "ab");
}

#[test]
fn assignment_wrapper_hides_the_value() {
    let mut forge = PayloadForge::new(rejecting(&["{{", "print", "if"]), ForgeOptions::default());
    let wrapper = forge.prepare().expect("assignment wrapper");
    assert!(!wrapper.visible);
    let generated = forge.generate(&int(5)).expect("prepared").expect("payload");
    assert_eq!(generated.payload, "{% set x=5 %}");
    assert!(!generated.visible);
}

#[test]
fn command_output_goes_through_read() {
    let payload = generate(permissive(), &Goal::ProcessSpawnAndRead("echo hi".into()));
    assert!(payload.contains(".popen('echo hi')"), "{payload}");
    assert!(payload.contains(".read()"), "{payload}");
    assert!(payload.contains("__import__('os')"), "{payload}");
}

#[test]
fn framework_config_needs_the_capability() {
    let mut without = PayloadForge::new(permissive(), ForgeOptions::default());
    assert_eq!(without.generate(&Goal::ConfigObject), Ok(None));

    let options = ForgeOptions {
        synthesis: SynthOptions {
            capabilities: Capabilities {
                framework: true,
                ..Capabilities::default()
            },
            ..SynthOptions::default()
        },
        ..ForgeOptions::default()
    };
    let mut with = PayloadForge::new(permissive(), options);
    let generated = with
        .generate(&Goal::ConfigObject)
        .expect("prepared")
        .expect("config");
    assert_eq!(generated.payload, "{{config}}");
}

#[test]
fn preamble_only_for_used_variables() {
    let oracle = |text: &str| !text.chars().any(|c| c.is_ascii_digit() || !c.is_ascii());
    let mut forge = PayloadForge::new(oracle, ForgeOptions::default());
    let detailed = forge
        .generate_detailed(&int(3))
        .expect("prepared")
        .expect("payload");
    let emitted: Vec<&str> = forge
        .context()
        .entries_for(&detailed.used)
        .map(|entry| entry.snippet.as_str())
        .collect();
    assert_eq!(emitted.len(), detailed.used.len());
    assert!(detailed.payload.starts_with(&emitted.concat()));
    assert!(detailed.payload.ends_with(&format!("{{{{{}}}}}", detailed.inner)));
}
