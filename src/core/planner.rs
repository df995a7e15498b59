//! # Test Execution Planner Module / 测试执行计划模块
//!
//! This module normalizes a declaration into an execution plan: the test
//! function, plus the ordered list of (input, expectation) invocations it
//! must go through. Plain declarations become a single invocation with no
//! input; data-provider declarations become one invocation per case.
//!
//! 此模块将声明规范化为执行计划：测试函数以及它必须经历的有序（输入，期望）调用列表。
//! 普通声明变为一次无输入的调用；数据提供者声明变为每个用例一次调用。

use crate::core::models::{Expectation, ExpectedResult, TestDeclaration, TestFn};
use crate::core::value::Value;

/// One planned call of the test function.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedInvocation {
    pub input: Value,
    pub expectation: Expectation,
}

/// Represents the complete execution plan for one declaration.
/// 表示一个声明的完整执行计划。
pub struct ExecutionPlan {
    /// The description shown in the result, already prefixed for data providers.
    /// 结果中显示的描述，数据提供者的描述已带前缀。
    pub description: String,
    pub test: TestFn,
    /// Invocations in the order they must run.
    /// 按必须运行的顺序排列的调用。
    pub invocations: Vec<PlannedInvocation>,
    /// Whether the invocations come from a data-provider table.
    /// 调用是否来自数据提供者表。
    pub is_data_driven: bool,
}

/// Creates the execution plan for a declaration.
///
/// The declaration itself is left untouched; the provider description is
/// derived from it rather than rewritten in place.
///
/// 为声明创建执行计划。声明本身保持不变。
pub fn plan_declaration(declaration: &TestDeclaration) -> ExecutionPlan {
    let invocations = match declaration {
        TestDeclaration::ExpectResult { expected, .. } => vec![PlannedInvocation {
            input: Value::Undefined,
            expectation: Expectation {
                result: ExpectedResult::from_value(expected.clone()),
                error: None,
            },
        }],
        TestDeclaration::ExpectThrow { error, .. } => vec![PlannedInvocation {
            input: Value::Undefined,
            expectation: Expectation {
                result: ExpectedResult::Unspecified,
                error: Some(error.clone()),
            },
        }],
        TestDeclaration::WithProvider { cases, .. } => cases
            .iter()
            .map(|case| PlannedInvocation {
                input: case.input.clone(),
                expectation: Expectation {
                    result: ExpectedResult::from_value(case.expected_output.clone()),
                    error: None,
                },
            })
            .collect(),
    };

    ExecutionPlan {
        description: declaration.display_description(),
        test: declaration.test().clone(),
        invocations,
        is_data_driven: declaration.is_data_driven(),
    }
}
