// ==========================================
// 波次分配系统 - LP 文件导出
// ==========================================
// 格式: CPLEX LP (Minimize / Subject To / Bounds / Generals / Binaries / End)
// 用途: 留档与离线复现,不参与求解
// ==========================================

use crate::solver::model::{LinearExpr, LinearProgram, VarKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 将模型写出为 LP 文件
pub fn write_lp_file<P: AsRef<Path>>(program: &LinearProgram, path: P) -> io::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_lp(program, &mut writer)?;
    writer.flush()
}

/// 将模型以 LP 文本格式写入 writer
pub fn write_lp<W: Write>(program: &LinearProgram, writer: &mut W) -> io::Result<()> {
    let names: Vec<String> = program
        .variables()
        .iter()
        .map(|v| sanitize_name(&v.name))
        .collect();

    writeln!(writer, "\\* {} *\\", program.name())?;
    writeln!(writer, "Minimize")?;
    writeln!(writer, " obj: {}", render_expr(program.objective(), &names))?;

    writeln!(writer, "Subject To")?;
    for constraint in program.constraints() {
        writeln!(
            writer,
            " {}: {} {} {}",
            sanitize_name(&constraint.name),
            render_expr(&constraint.expr, &names),
            constraint.sense,
            format_number(constraint.rhs)
        )?;
    }

    // 默认下界为 0,仅输出非默认边界
    let mut bounds = Vec::new();
    for (def, name) in program.variables().iter().zip(&names) {
        if def.kind == VarKind::Binary {
            continue;
        }
        match def.upper {
            Some(upper) => bounds.push(format!(
                " {} <= {} <= {}",
                format_number(def.lower),
                name,
                format_number(upper)
            )),
            None if def.lower != 0.0 => {
                bounds.push(format!(" {} >= {}", name, format_number(def.lower)))
            }
            None => {}
        }
    }
    if !bounds.is_empty() {
        writeln!(writer, "Bounds")?;
        for line in bounds {
            writeln!(writer, "{}", line)?;
        }
    }

    write_section(writer, "Generals", program, &names, VarKind::Integer)?;
    write_section(writer, "Binaries", program, &names, VarKind::Binary)?;
    writeln!(writer, "End")
}

fn write_section<W: Write>(
    writer: &mut W,
    header: &str,
    program: &LinearProgram,
    names: &[String],
    kind: VarKind,
) -> io::Result<()> {
    let selected: Vec<&str> = program
        .variables()
        .iter()
        .zip(names)
        .filter(|(def, _)| def.kind == kind)
        .map(|(_, name)| name.as_str())
        .collect();
    if selected.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{}", header)?;
    for chunk in selected.chunks(8) {
        writeln!(writer, " {}", chunk.join(" "))?;
    }
    Ok(())
}

fn render_expr(expr: &LinearExpr, names: &[String]) -> String {
    if expr.is_empty() {
        // LP 格式不允许空表达式
        return match names.first() {
            Some(first) => format!("0 {}", first),
            None => "0".to_string(),
        };
    }

    let mut out = String::new();
    for (i, (var, coef)) in expr.terms().iter().enumerate() {
        let name = names.get(var.index()).map(String::as_str).unwrap_or("?");
        let sign = if *coef < 0.0 { "-" } else { "+" };
        if i > 0 || *coef < 0.0 {
            out.push_str(sign);
            out.push(' ');
        }
        out.push_str(&format_number(coef.abs()));
        out.push(' ');
        out.push_str(name);
        out.push(' ');
    }
    out.trim_end().to_string()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(program: &LinearProgram) -> String {
        let mut buf = Vec::new();
        write_lp(program, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_lp_sections() {
        let mut program = LinearProgram::new("BatchOptFirstModel");
        let x = program.add_integer("x_b1_wp0");
        let y = program.add_binary("y_b1_w1");
        program.add_le(
            "touch b1 w1",
            LinearExpr::new().with_term(x, 1.0).with_term(y, -4.0),
            0.0,
        );
        program.set_objective(LinearExpr::new().with_term(y, 1.0));

        let text = render(&program);
        assert!(text.contains("Minimize\n obj: 1 y_b1_w1\n"));
        assert!(text.contains(" touch_b1_w1: 1 x_b1_wp0 - 4 y_b1_w1 <= 0\n"));
        assert!(text.contains("Generals\n x_b1_wp0\n"));
        assert!(text.contains("Binaries\n y_b1_w1\n"));
        assert!(!text.contains("Bounds"));
        assert!(text.trim_end().ends_with("End"));
    }

    #[test]
    fn test_write_lp_empty_objective() {
        let mut program = LinearProgram::new("empty");
        program.add_integer("x");
        let text = render(&program);
        assert!(text.contains(" obj: 0 x\n"));
    }

    #[test]
    fn test_write_lp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.lp");
        let mut program = LinearProgram::new("file");
        let x = program.add_integer("x");
        program.add_eq("fix", LinearExpr::new().with_term(x, 1.0), 2.0);
        write_lp_file(&program, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(" fix: 1 x = 2\n"));
    }
}
