//! Step definitions driving the merge engine and validator.

use anyhow::{Context, Result, anyhow, ensure};
use dashpack::{Collection, IssueCode, MergeEngine, MergeResult, validate};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Map, Value, json};
use test_helpers::fetch::MemoryPacks;
use test_helpers::packs::{self, LCARS_PACK};
use test_helpers::text::{list, unquote};

use crate::fixtures::MergeContext;

fn edit_user(ctx: &MergeContext, edit: impl FnOnce(&mut Map<String, Value>)) {
    let mut user = ctx.user.take().unwrap_or_else(|| json!({}));
    if let Some(map) = user.as_object_mut() {
        edit(map);
    }
    ctx.user.set(user);
}

fn section<'a>(map: &'a mut Map<String, Value>, key: &str, empty: Value) -> &'a mut Value {
    map.entry(key.to_owned()).or_insert(empty)
}

fn push_overlay(ctx: &MergeContext, overlay: Value) {
    edit_user(ctx, |map| {
        if let Some(overlays) = section(map, "overlays", json!([])).as_array_mut() {
            overlays.push(overlay);
        }
    });
}

fn set_palette_token(ctx: &MergeContext, palette: &str, token: &str, value: Value) {
    edit_user(ctx, |map| {
        let palettes = section(map, "palettes", json!({}));
        if let Some(palettes) = palettes.as_object_mut() {
            let tokens = palettes
                .entry(palette.to_owned())
                .or_insert_with(|| json!({}));
            if let Some(tokens) = tokens.as_object_mut() {
                tokens.insert(token.to_owned(), value);
            }
        }
    });
}

fn parse_code(code: &str) -> Result<IssueCode> {
    serde_json::from_value(json!(unquote(code)))
        .with_context(|| format!("unknown issue code {code}"))
}

fn run_merge(ctx: &MergeContext) -> Result<MergeResult> {
    let user = ctx.user.get().unwrap_or_else(|| json!({}));
    let served = ctx.packs.take().unwrap_or_default();
    let engine = MergeEngine::new(packs::registry()).with_fetcher(served.fetcher());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build runtime")?;
    let result = runtime.block_on(engine.merge(&user));
    ctx.packs.set(served);
    Ok(result)
}

fn merged(ctx: &MergeContext) -> Result<MergeResult> {
    ctx.result
        .get()
        .ok_or_else(|| anyhow!("the packs have not been merged"))
}

#[given("the lcars built-in pack is selected")]
fn select_lcars(merge_context: &MergeContext) {
    edit_user(merge_context, |map| {
        map.insert("use_packs".to_owned(), json!({"builtin": [LCARS_PACK], "external": []}));
    });
}

#[given("the user sets overlay {id} color to {color}")]
fn set_overlay_color(merge_context: &MergeContext, id: String, color: String) -> Result<()> {
    let mut overlay = packs::lcars_pack()["overlays"]
        .as_array()
        .and_then(|overlays| {
            overlays
                .iter()
                .find(|overlay| overlay["id"] == json!(unquote(&id)))
                .cloned()
        })
        .with_context(|| format!("lcars pack has no overlay {id}"))?;
    overlay["color"] = json!(unquote(&color));
    push_overlay(merge_context, overlay);
    Ok(())
}

#[given("the user restates overlay {id} from the lcars pack")]
fn restate_overlay(merge_context: &MergeContext, id: String) -> Result<()> {
    let overlay = packs::lcars_pack()["overlays"]
        .as_array()
        .and_then(|overlays| {
            overlays
                .iter()
                .find(|overlay| overlay["id"] == json!(unquote(&id)))
                .cloned()
        })
        .with_context(|| format!("lcars pack has no overlay {id}"))?;
    push_overlay(merge_context, overlay);
    Ok(())
}

#[given("the user sets palette {palette} token {token} to {value}")]
fn set_token(merge_context: &MergeContext, palette: String, token: String, value: String) {
    set_palette_token(
        merge_context,
        unquote(&palette),
        unquote(&token),
        json!(unquote(&value)),
    );
}

#[given("the user clears palette {palette} token {token}")]
fn clear_token(merge_context: &MergeContext, palette: String, token: String) {
    set_palette_token(merge_context, unquote(&palette), unquote(&token), Value::Null);
}

#[given("the user removes overlays {ids}")]
fn remove_overlays(merge_context: &MergeContext, ids: String) {
    let removed = list(&ids);
    edit_user(merge_context, |map| {
        map.insert("remove".to_owned(), json!({"overlays": removed}));
    });
}

#[given("the user adds a {kind} overlay {id} attached to {target}")]
fn add_attached_overlay(merge_context: &MergeContext, kind: String, id: String, target: String) {
    push_overlay(
        merge_context,
        json!({"id": unquote(&id), "type": unquote(&kind), "attach_to": unquote(&target)}),
    );
}

#[given("the user adds an untyped overlay {id}")]
fn add_untyped_overlay(merge_context: &MergeContext, id: String) {
    push_overlay(merge_context, json!({"id": unquote(&id)}));
}

#[given("external pack {url} routes {key} to {value}")]
fn external_routing(merge_context: &MergeContext, url: String, key: String, value: String) {
    let address = unquote(&url).to_owned();
    let body = json!({"routing": {unquote(&key): unquote(&value)}}).to_string();
    let served = merge_context.packs.take().unwrap_or_default().with(&address, &body);
    merge_context.packs.set(served);
    add_external(merge_context, address);
}

#[given("external pack {url} is unreachable")]
fn external_unreachable(merge_context: &MergeContext, url: String) {
    let address = unquote(&url).to_owned();
    let served = merge_context
        .packs
        .take()
        .unwrap_or_default()
        .failing(&address, "connection refused");
    merge_context.packs.set(served);
    add_external(merge_context, address);
}

fn add_external(ctx: &MergeContext, url: String) {
    edit_user(ctx, |map| {
        let selection = section(map, "use_packs", json!({}));
        if let Some(selection) = selection.as_object_mut() {
            let external = selection
                .entry("external")
                .or_insert_with(|| json!([]));
            if let Some(external) = external.as_array_mut() {
                external.push(Value::String(url));
            }
        }
    });
}

#[when("the packs are merged")]
fn merge_packs(merge_context: &MergeContext) -> Result<()> {
    let result = run_merge(merge_context)?;
    merge_context.result.set(result);
    Ok(())
}

#[when("the packs are merged and validated")]
fn merge_and_validate(merge_context: &MergeContext) -> Result<()> {
    let result = run_merge(merge_context)?;
    let user = merge_context.user.get();
    merge_context.report.set(validate(&result.merged, user.as_ref()));
    merge_context.result.set(result);
    Ok(())
}

#[then("overlay {id} has color {color}")]
fn overlay_color(merge_context: &MergeContext, id: String, color: String) -> Result<()> {
    let result = merged(merge_context)?;
    let overlay = result
        .merged
        .overlays
        .iter()
        .find(|overlay| overlay.id == unquote(&id))
        .with_context(|| format!("overlay {id} missing"))?;
    ensure!(
        overlay.fields.get("color") == Some(&json!(unquote(&color))),
        "unexpected overlay {:?}",
        overlay
    );
    Ok(())
}

#[then("overlay {id} originates from {origin} and was overridden by {layer}")]
fn overlay_provenance(
    merge_context: &MergeContext,
    id: String,
    origin: String,
    layer: String,
) -> Result<()> {
    let result = merged(merge_context)?;
    let entry = result
        .provenance
        .item(Collection::Overlays, unquote(&id))
        .with_context(|| format!("no provenance for overlay {id}"))?;
    ensure!(entry.origin_pack == unquote(&origin), "origin was {}", entry.origin_pack);
    ensure!(entry.overridden, "overlay {id} should be overridden");
    ensure!(
        entry.override_layer.as_deref() == Some(unquote(&layer)),
        "override layer was {:?}",
        entry.override_layer
    );
    Ok(())
}

#[then("overlay {id} is absent")]
fn overlay_absent(merge_context: &MergeContext, id: String) -> Result<()> {
    let result = merged(merge_context)?;
    ensure!(
        !result.merged.ids(Collection::Overlays).contains(&unquote(&id)),
        "overlay {id} still present"
    );
    Ok(())
}

#[then("overlay {id} was removed by {source}")]
fn overlay_removed_by(merge_context: &MergeContext, id: String, source: String) -> Result<()> {
    let result = merged(merge_context)?;
    let entry = result
        .provenance
        .item(Collection::Overlays, unquote(&id))
        .with_context(|| format!("no provenance for overlay {id}"))?;
    ensure!(entry.removed, "overlay {id} not marked removed");
    let recorded = entry.removal_source.as_ref().map(ToString::to_string);
    ensure!(
        recorded.as_deref() == Some(unquote(&source)),
        "removal source was {recorded:?}"
    );
    Ok(())
}

#[then("no issues are reported")]
fn no_issues(merge_context: &MergeContext) -> Result<()> {
    let result = merged(merge_context)?;
    ensure!(result.issues.is_empty(), "unexpected issues {:?}", result.issues);
    Ok(())
}

#[then("exactly {count:usize} {code} issue is reported")]
fn exact_issue_count(merge_context: &MergeContext, count: usize, code: String) -> Result<()> {
    let result = merged(merge_context)?;
    let expected = parse_code(&code)?;
    let found = result.issues_with(expected).count();
    ensure!(found == count, "expected {count} {code} issues, found {:?}", result.issues);
    Ok(())
}

#[then("palette {palette} token {token} is {value}")]
fn palette_token(
    merge_context: &MergeContext,
    palette: String,
    token: String,
    value: String,
) -> Result<()> {
    let result = merged(merge_context)?;
    let tokens = result
        .merged
        .palettes
        .get(unquote(&palette))
        .with_context(|| format!("palette {palette} missing"))?;
    ensure!(
        tokens.get(unquote(&token)) == Some(&json!(unquote(&value))),
        "unexpected palette {tokens:?}"
    );
    Ok(())
}

#[then("palette {palette} has no token {token}")]
fn palette_lacks_token(merge_context: &MergeContext, palette: String, token: String) -> Result<()> {
    let result = merged(merge_context)?;
    let tokens = result
        .merged
        .palettes
        .get(unquote(&palette))
        .with_context(|| format!("palette {palette} missing"))?;
    ensure!(!tokens.contains_key(unquote(&token)), "token {token} survived");
    Ok(())
}

#[then("routing {key} is {value}")]
fn routing_value(merge_context: &MergeContext, key: String, value: String) -> Result<()> {
    let result = merged(merge_context)?;
    ensure!(
        result.merged.routing.get(unquote(&key)) == Some(&json!(unquote(&value))),
        "unexpected routing {:?}",
        result.merged.routing
    );
    Ok(())
}

#[then("validation passes with a {code} warning")]
fn validation_warns(merge_context: &MergeContext, code: String) -> Result<()> {
    let report = merge_context
        .report
        .get()
        .ok_or_else(|| anyhow!("validation has not run"))?;
    let expected = parse_code(&code)?;
    ensure!(report.is_valid(), "unexpected errors {:?}", report.errors);
    ensure!(
        report.warnings.iter().any(|issue| issue.code == expected),
        "no {code} warning in {:?}",
        report.warnings
    );
    Ok(())
}

#[then("validation fails with a {code} error")]
fn validation_errors(merge_context: &MergeContext, code: String) -> Result<()> {
    let report = merge_context
        .report
        .get()
        .ok_or_else(|| anyhow!("validation has not run"))?;
    let expected = parse_code(&code)?;
    ensure!(
        report.errors.iter().any(|issue| issue.code == expected),
        "no {code} error in {:?}",
        report.errors
    );
    Ok(())
}
