//! Project health checks performed on the source tree.
//!
//! Covers installed apps, payment URL names and the payment/order model
//! shape by reading the files directly; no interpreter or database is
//! started. Requirement lists are checked for drift against the frozen list
//! as well.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::project::Project;
use crate::requirements::{self, BaseMatcher, DEV_HEADER};

const PAYMENTS_APP: &str = "apps.payments";
const ORDERS_APP: &str = "apps.orders";

const PAYMENT_URL_NAMESPACE: &str = "payments";
const PAYMENT_URL_NAMES: &[&str] = &["checkout", "mock_gateway", "success", "failed"];

const PAYMENT_FIELDS: &[&str] = &[
    "order",
    "amount",
    "currency",
    "provider",
    "status",
    "external_id",
    "attempt_count",
    "max_attempts",
    "paid_at",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoctorSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorIssue {
    pub severity: DoctorSeverity,
    pub code: String,
    pub message: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub files_scanned: usize,
    pub checks_passed: usize,
    pub issues: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub command: String,
    pub root: String,
    pub summary: DoctorSummary,
    pub passed: Vec<String>,
    pub issues: Vec<DoctorIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
}

impl DoctorReport {
    pub fn exit_code(&self, fail_on: FailOn) -> i32 {
        let failing = |issue: &DoctorIssue| match fail_on {
            FailOn::Error => issue.severity == DoctorSeverity::Error,
            FailOn::Warning => issue.severity <= DoctorSeverity::Warning,
        };

        if self.issues.iter().any(failing) {
            1
        } else {
            0
        }
    }
}

pub fn scan(project: &Project) -> DoctorReport {
    let mut scanner = Scanner::new(&project.root);
    let defaults = project.defaults();

    scanner.check_manage_script(&defaults.manage_script);
    for module in &defaults.doctor.settings_modules {
        scanner.check_settings_module(module);
    }
    for app in &defaults.doctor.required_apps {
        scanner.check_app(app);
    }
    scanner.check_installed_apps(
        &defaults.doctor.required_apps,
        &defaults.doctor.settings_modules,
    );
    scanner.check_payment_urls();
    scanner.check_payment_model();
    scanner.check_order_model();
    scanner.check_requirements(
        &project.requirements_dir(),
        &defaults.requirements.base_packages,
    );

    scanner.finish()
}

struct Scanner {
    root: PathBuf,
    files_scanned: usize,
    passed: Vec<String>,
    issues: Vec<DoctorIssue>,
}

impl Scanner {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files_scanned: 0,
            passed: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn ok(&mut self, message: impl Into<String>) {
        self.passed.push(message.into());
    }

    fn push(&mut self, severity: DoctorSeverity, code: &str, message: impl Into<String>, file: &Path) {
        let file = file
            .strip_prefix(&self.root)
            .unwrap_or(file)
            .display()
            .to_string();

        self.issues.push(DoctorIssue {
            severity,
            code: code.to_string(),
            message: message.into(),
            file,
        });
    }

    fn read(&mut self, path: &Path) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        self.files_scanned += 1;
        Some(content)
    }

    fn check_manage_script(&mut self, script: &str) {
        let path = self.root.join(script);
        if path.is_file() {
            self.ok(format!("management script {}", script));
        } else {
            self.push(
                DoctorSeverity::Error,
                "manage_script.missing",
                format!("Management script not found: {}", script),
                &path,
            );
        }
    }

    fn check_settings_module(&mut self, module: &str) {
        let path = paths::module_file(&self.root, module);
        if path.is_file() {
            self.ok(format!("settings module {}", module));
        } else {
            self.push(
                DoctorSeverity::Error,
                "settings.missing",
                format!("Settings module not found: {}", module),
                &path,
            );
        }
    }

    fn check_app(&mut self, app: &str) {
        let dir = paths::module_dir(&self.root, app);
        if !dir.is_dir() {
            self.push(
                DoctorSeverity::Error,
                "app.missing",
                format!("Required app not found: {}", app),
                &dir,
            );
            return;
        }

        let models = dir.join("models.py");
        if models.is_file() {
            self.ok(format!("app {}", app));
        } else {
            self.push(
                DoctorSeverity::Warning,
                "app.no_models",
                format!("App {} has no models.py", app),
                &models,
            );
        }
    }

    /// Every required app must appear in INSTALLED_APPS of one of the settings modules,
    /// either by dotted path or through its AppConfig (`apps.orders.apps.OrdersConfig`).
    fn check_installed_apps(&mut self, apps: &[String], settings_modules: &[String]) {
        let mut sources = Vec::new();
        for module in settings_modules {
            let path = paths::module_file(&self.root, module);
            if let Some(source) = self.read(&path) {
                sources.push((path, source));
            }
        }
        let Some((first_settings, _)) = sources.first() else {
            return;
        };
        let first_settings = first_settings.clone();

        for app in apps {
            if sources.iter().any(|(_, source)| lists_installed_app(source, app)) {
                self.ok(format!("installed app {}", app));
            } else {
                self.push(
                    DoctorSeverity::Error,
                    "app.not_installed",
                    format!("Missing in INSTALLED_APPS: {}", app),
                    &first_settings,
                );
            }
        }
    }

    fn check_payment_urls(&mut self) {
        let path = paths::module_dir(&self.root, PAYMENTS_APP).join("urls.py");
        let Some(source) = self.read(&path) else {
            self.push(
                DoctorSeverity::Error,
                "urls.missing",
                "apps.payments.urls not found",
                &path,
            );
            return;
        };

        if !sets_app_name(&source, PAYMENT_URL_NAMESPACE) {
            self.push(
                DoctorSeverity::Error,
                "url.namespace_missing",
                format!("apps.payments.urls must set app_name = '{}'", PAYMENT_URL_NAMESPACE),
                &path,
            );
        }

        for name in PAYMENT_URL_NAMES {
            if names_url(&source, name) {
                self.ok(format!("url '{}:{}'", PAYMENT_URL_NAMESPACE, name));
            } else {
                self.push(
                    DoctorSeverity::Error,
                    "url.missing",
                    format!("Missing url name: {}:{}", PAYMENT_URL_NAMESPACE, name),
                    &path,
                );
            }
        }
    }

    fn check_payment_model(&mut self) {
        let path = paths::module_dir(&self.root, PAYMENTS_APP).join("models.py");
        let Some(source) = self.read(&path) else {
            return;
        };

        let Some(payment) = class_body(&source, "Payment") else {
            self.push(
                DoctorSeverity::Error,
                "model.missing",
                "apps.payments.models.Payment not found",
                &path,
            );
            return;
        };

        let missing: Vec<&str> = PAYMENT_FIELDS
            .iter()
            .copied()
            .filter(|field| !defines_attribute(payment, field))
            .collect();

        for field in &missing {
            self.push(
                DoctorSeverity::Error,
                "model.field_missing",
                format!("Payment missing field: {}", field),
                &path,
            );
        }

        if has_foreign_key_to_order(payment) {
            self.ok("Payment.order ForeignKey -> orders.Order(payments)");
        } else if !missing.contains(&"order") {
            self.push(
                DoctorSeverity::Error,
                "model.relation_invalid",
                "Payment.order must be a ForeignKey to orders.Order with related_name='payments'",
                &path,
            );
        }

        if missing.is_empty() {
            self.ok("Payment fields");
        }
    }

    fn check_order_model(&mut self) {
        let path = paths::module_dir(&self.root, ORDERS_APP).join("models.py");
        let Some(source) = self.read(&path) else {
            return;
        };

        if defines_class(&source, "Payment") {
            self.push(
                DoctorSeverity::Warning,
                "model.duplicate",
                "Found apps.orders.models.Payment (consider removing/renaming)",
                &path,
            );
        }

        let Some(order) = class_body(&source, "Order") else {
            self.push(
                DoctorSeverity::Error,
                "model.missing",
                "apps.orders.models.Order not found",
                &path,
            );
            return;
        };

        if defines_attribute(order, "number") {
            self.ok("Order.number");
        } else {
            self.push(
                DoctorSeverity::Error,
                "model.field_missing",
                "Order missing field: number",
                &path,
            );
        }

        if !defines_attribute(order, "is_paid") {
            self.push(
                DoctorSeverity::Warning,
                "model.attribute_missing",
                "Order missing 'is_paid' (property/field)",
                &path,
            );
        }

        if defines_attribute(order, "total_payable") || defines_attribute(order, "total_amount") {
            self.ok("Order total");
        } else {
            self.push(
                DoctorSeverity::Error,
                "model.attribute_missing",
                "Order must have either 'total_payable' or 'total_amount'",
                &path,
            );
        }
    }

    fn check_requirements(&mut self, dir: &Path, base_packages: &[String]) {
        let full = paths::full_txt(dir);
        let base = paths::base_txt(dir);
        let dev = paths::dev_txt(dir);

        let Some(frozen) = self.read(&full) else {
            self.push(
                DoctorSeverity::Info,
                "requirements.not_frozen",
                "No frozen requirements; run 'shopdev reqs update'",
                &full,
            );
            return;
        };

        let base_text = self.read(&base);
        let dev_text = self.read(&dev);

        if base_text.is_none() || dev_text.is_none() {
            self.push(
                DoctorSeverity::Warning,
                "requirements.not_split",
                "base.txt/dev.txt missing; run 'shopdev reqs split'",
                dir,
            );
            return;
        }

        if let Some(dev_text) = &dev_text {
            if dev_text.lines().next() != Some(DEV_HEADER) {
                self.push(
                    DoctorSeverity::Error,
                    "requirements.dev_header",
                    format!("dev.txt must start with '{}'", DEV_HEADER),
                    &dev,
                );
            }
        }

        let matcher = match BaseMatcher::new(base_packages) {
            Ok(matcher) => matcher,
            Err(err) => {
                let problem = err.details["problem"].as_str().unwrap_or(&err.message);
                self.push(
                    DoctorSeverity::Error,
                    "requirements.base_packages_invalid",
                    format!("Cannot check split drift: {}", problem),
                    dir,
                );
                return;
            }
        };
        let expected = requirements::split(&frozen, &matcher);

        if base_text.as_deref() == Some(expected.base_text().as_str())
            && dev_text.as_deref() == Some(expected.dev_text().as_str())
        {
            self.ok("requirements split up to date");
        } else {
            self.push(
                DoctorSeverity::Warning,
                "requirements.stale",
                "base.txt/dev.txt differ from full.txt; run 'shopdev reqs split'",
                dir,
            );
        }
    }

    fn finish(mut self) -> DoctorReport {
        self.issues.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.code.cmp(&b.code))
        });

        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            let key = match issue.severity {
                DoctorSeverity::Error => "error",
                DoctorSeverity::Warning => "warning",
                DoctorSeverity::Info => "info",
            };
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }

        DoctorReport {
            command: "doctor.scan".to_string(),
            root: self.root.display().to_string(),
            summary: DoctorSummary {
                files_scanned: self.files_scanned,
                checks_passed: self.passed.len(),
                issues: counts,
            },
            passed: self.passed,
            issues: self.issues,
        }
    }
}

fn defines_class(source: &str, name: &str) -> bool {
    class_body(source, name).is_some()
}

/// Source of top-level `class name`, from its header to the next unindented line.
fn class_body<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let re = Regex::new(&format!(r"(?m)^class\s+{}\b", regex::escape(name))).ok()?;
    let rest = &source[re.find(source)?.start()..];

    let mut end = 0;
    let mut in_header = true;
    for line in rest.split_inclusive('\n') {
        if !in_header && !line.trim().is_empty() && !line.starts_with([' ', '\t']) {
            break;
        }
        if in_header && line.trim_end().ends_with(':') {
            in_header = false;
        }
        end += line.len();
    }

    Some(&rest[..end])
}

/// Class-level assignment or method/property named `name`.
fn defines_attribute(source: &str, name: &str) -> bool {
    let name = regex::escape(name);
    Regex::new(&format!(r"(?m)^\s+(?:{name}\s*[:=]|def\s+{name}\s*\()"))
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

fn lists_installed_app(source: &str, app: &str) -> bool {
    Regex::new(&format!(r#"["']{}(?:\.apps\.\w+)?["']"#, regex::escape(app)))
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

fn sets_app_name(source: &str, namespace: &str) -> bool {
    Regex::new(&format!(r#"(?m)^app_name\s*=\s*["']{}["']"#, regex::escape(namespace)))
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

fn names_url(source: &str, name: &str) -> bool {
    Regex::new(&format!(r#"\bname\s*=\s*["']{}["']"#, regex::escape(name)))
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

fn has_foreign_key_to_order(source: &str) -> bool {
    Regex::new(r#"(?ms)^\s+order\s*=\s*models\.ForeignKey\((.*?)\)\s*$"#)
        .ok()
        .and_then(|re| re.captures(source))
        .and_then(|caps| caps.get(1))
        .map(|body| {
            let body = body.as_str();
            body.contains("Order")
                && (body.contains(r#"related_name="payments""#)
                    || body.contains("related_name='payments'"))
        })
        .unwrap_or(false)
}
