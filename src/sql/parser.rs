/// SQL Parser - extracts the clause set of a SELECT statement from tokens
use super::ast::*;
use super::token::{render, Token, TokenType};
use crate::error::{Result, SandboxError};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenType::Eof, String::new(), line, column));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a SELECT statement
    ///
    /// Clause order: `SELECT .. FROM .. [JOIN .. ON ..] [WHERE ..] [GROUP BY ..]
    /// [ORDER BY ..] [;]`
    pub fn parse(&mut self) -> Result<ClauseSet> {
        if !self.match_token(TokenType::Select) {
            return Err(self.error("Expected SELECT"));
        }

        if matches!(self.current().token_type, TokenType::Distinct) {
            return Err(self.error("DISTINCT is not supported"));
        }

        let columns = self.parse_select_items()?;

        // FROM clause
        if !self.match_token(TokenType::From) {
            return Err(SandboxError::MissingClause("FROM".into()));
        }
        let from = match self.parse_table_ref()? {
            Some(table) => table,
            None => return Err(SandboxError::MissingClause("FROM".into())),
        };

        // JOIN clause (optional)
        let join = if self.is_join_keyword() {
            Some(self.parse_join()?)
        } else {
            None
        };
        if self.is_join_keyword() {
            return Err(self.error("Only one JOIN is supported"));
        }

        // WHERE clause (optional)
        let where_tokens = if self.match_token(TokenType::Where) {
            Some(self.collect_until(|t| {
                matches!(
                    t,
                    TokenType::Group
                        | TokenType::Order
                        | TokenType::Having
                        | TokenType::Limit
                        | TokenType::Offset
                        | TokenType::Semicolon
                        | TokenType::Eof
                )
            }))
        } else {
            None
        };

        // GROUP BY clause (optional)
        let group_by = if self.match_token(TokenType::Group) {
            self.expect(TokenType::By)?;
            Some(self.parse_column_ref()?.1)
        } else {
            None
        };

        // ORDER BY clause (optional)
        let order_by = if self.match_token(TokenType::Order) {
            self.expect(TokenType::By)?;
            let (_, column) = self.parse_column_ref()?;
            let descending = if self.match_token(TokenType::Desc) {
                true
            } else {
                self.match_token(TokenType::Asc); // Optional
                false
            };
            Some(OrderBy { column, descending })
        } else {
            None
        };

        // Optionally consume semicolon
        self.match_token(TokenType::Semicolon);

        self.expect_end()?;

        Ok(ClauseSet {
            columns,
            from,
            join,
            where_tokens,
            group_by,
            order_by,
        })
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = Vec::new();

        loop {
            items.push(self.parse_select_item()?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if self.match_token(TokenType::Star) {
            return Ok(SelectItem::Star);
        }

        let TokenType::Identifier(first) = &self.current().token_type else {
            if matches!(self.current().token_type, TokenType::From) {
                return Err(self.error("Expected column before FROM"));
            }
            return Err(self.error(&format!("Unexpected token '{}'", self.current().lexeme)));
        };

        // Function call: NAME(arg)
        if matches!(self.peek().token_type, TokenType::LParen) {
            let func = AggregateFunc::from_name(first)
                .ok_or_else(|| self.error(&format!("Unknown function '{}'", first)))?;
            self.advance(); // function name
            self.advance(); // '('

            let arg = if self.match_token(TokenType::Star) {
                if func != AggregateFunc::Count {
                    return Err(self.error(&format!(
                        "{}(*) is not supported",
                        func.name().to_uppercase()
                    )));
                }
                AggregateArg::Star
            } else {
                AggregateArg::Column(self.parse_column_ref()?.1)
            };
            self.expect(TokenType::RParen)?;

            let alias = self.parse_alias()?;
            return Ok(SelectItem::Aggregate {
                call: AggregateCall { func, arg },
                alias,
            });
        }

        let (qualifier, name) = self.parse_column_ref()?;
        let alias = self.parse_alias()?;
        Ok(SelectItem::Column {
            qualifier,
            name,
            alias,
        })
    }

    /// `name` or `qualifier.name`, lower-cased
    fn parse_column_ref(&mut self) -> Result<(Option<String>, String)> {
        let first = self.parse_identifier()?;
        if self.match_token(TokenType::Dot) {
            let name = self.parse_identifier()?;
            Ok((Some(first), name))
        } else {
            Ok((None, first))
        }
    }

    /// `AS alias` or a bare trailing identifier
    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.match_token(TokenType::As) {
            Ok(Some(self.parse_identifier()?))
        } else if matches!(self.current().token_type, TokenType::Identifier(_)) {
            // Allow implicit alias (without AS keyword)
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// `table_name [AS alias]`; `None` when no table name follows
    fn parse_table_ref(&mut self) -> Result<Option<TableRef>> {
        if !matches!(self.current().token_type, TokenType::Identifier(_)) {
            return Ok(None);
        }
        let name = self.parse_identifier()?;
        let alias = self.parse_alias()?;
        Ok(Some(TableRef { name, alias }))
    }

    /// Check if current token starts a JOIN
    fn is_join_keyword(&self) -> bool {
        matches!(
            self.current().token_type,
            TokenType::Join
                | TokenType::Inner
                | TokenType::Left
                | TokenType::Right
                | TokenType::Full
                | TokenType::Outer
        )
    }

    fn parse_join(&mut self) -> Result<JoinClause> {
        match self.current().token_type {
            TokenType::Inner => {
                self.advance();
                self.expect(TokenType::Join)?;
            }
            TokenType::Join => self.advance(),
            _ => {
                let kind = self.current().lexeme.to_uppercase();
                return Err(self.error(&format!("{} JOIN is not supported", kind)));
            }
        }

        let right = self
            .parse_table_ref()?
            .ok_or_else(|| self.error("Expected table name after JOIN"))?;

        if !self.match_token(TokenType::On) {
            return Err(SandboxError::MissingClause("ON".into()));
        }

        let condition = self.collect_until(|t| {
            matches!(
                t,
                TokenType::Where
                    | TokenType::Group
                    | TokenType::Order
                    | TokenType::Join
                    | TokenType::Inner
                    | TokenType::Left
                    | TokenType::Right
                    | TokenType::Full
                    | TokenType::Outer
                    | TokenType::Semicolon
                    | TokenType::Eof
            )
        });

        Self::join_condition(right, &condition)
    }

    /// `lq.lcol = rq.rcol`, nothing more and nothing less
    fn join_condition(right: TableRef, tokens: &[Token]) -> Result<JoinClause> {
        let types: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();
        match types.as_slice() {
            [TokenType::Identifier(lq), TokenType::Dot, TokenType::Identifier(lc), TokenType::Eq, TokenType::Identifier(rq), TokenType::Dot, TokenType::Identifier(rc)] => {
                Ok(JoinClause {
                    right,
                    left_qualifier: lq.to_lowercase(),
                    left_column: lc.to_lowercase(),
                    right_qualifier: rq.to_lowercase(),
                    right_column: rc.to_lowercase(),
                })
            }
            _ => Err(SandboxError::InvalidJoinCondition(render(tokens))),
        }
    }

    /// Consume tokens up to (not including) the first one matching `stop`
    fn collect_until(&mut self, stop: impl Fn(&TokenType) -> bool) -> Vec<Token> {
        let mut collected = Vec::new();
        while !stop(&self.current().token_type) {
            collected.push(self.current().clone());
            self.advance();
        }
        collected
    }

    fn expect_end(&self) -> Result<()> {
        let token = self.current();
        match token.token_type {
            TokenType::Eof => Ok(()),
            TokenType::Having | TokenType::Limit | TokenType::Offset => Err(self.error(&format!(
                "{} is not supported",
                token.lexeme.to_uppercase()
            ))),
            _ => Err(self.error(&format!("Unexpected token '{}'", token.lexeme))),
        }
    }

    // Helper methods

    fn parse_identifier(&mut self) -> Result<String> {
        if let TokenType::Identifier(name) = &self.current().token_type {
            let name = name.to_lowercase();
            self.advance();
            Ok(name)
        } else {
            Err(self.error("Expected identifier"))
        }
    }

    fn current(&self) -> &Token {
        // new() guarantees a trailing Eof and advance() never moves past it
        &self.tokens[self.position]
    }

    fn peek(&self) -> &Token {
        let next = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[next]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if std::mem::discriminant(&self.current().token_type) == std::mem::discriminant(&token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType) -> Result<()> {
        if self.match_token(token_type.clone()) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected {:?}", token_type)))
        }
    }

    fn error(&self, msg: &str) -> SandboxError {
        let token = self.current();
        SandboxError::Syntax(format!(
            "{} at line {} column {}",
            msg, token.line, token.column
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::lexer::Lexer;

    fn parse_sql(sql: &str) -> Result<ClauseSet> {
        let tokens = Lexer::new(sql).tokenize();
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_parse_without_eof_token() {
        assert!(matches!(Parser::new(Vec::new()).parse(), Err(SandboxError::Syntax(_))));

        let mut tokens = Lexer::new("SELECT * FROM t").tokenize();
        tokens.pop();
        let clauses = Parser::new(tokens).parse().unwrap();
        assert_eq!(clauses.from.name, "t");
    }

    #[test]
    fn test_parse_simple_select() {
        let clauses = parse_sql("SELECT * FROM Employees").unwrap();
        assert!(clauses.is_select_star());
        assert_eq!(clauses.from.name, "employees");
        assert!(clauses.join.is_none());
        assert!(clauses.where_tokens.is_none());
    }

    #[test]
    fn test_parse_columns_and_aliases() {
        let clauses = parse_sql("SELECT e.Name AS n, salary pay, id FROM employees e").unwrap();
        assert_eq!(
            clauses.columns[0],
            SelectItem::Column {
                qualifier: Some("e".into()),
                name: "name".into(),
                alias: Some("n".into()),
            }
        );
        assert_eq!(clauses.columns[1].source_column(), Some("salary"));
        assert_eq!(clauses.columns[2].source_column(), Some("id"));
        assert_eq!(clauses.from.alias.as_deref(), Some("e"));
    }

    #[test]
    fn test_parse_aggregates() {
        let clauses =
            parse_sql("SELECT department, COUNT(*), avg(e.salary) AS a FROM employees GROUP BY department")
                .unwrap();
        let names: Vec<String> = clauses.aggregates().iter().map(|a| a.output_name()).collect();
        assert_eq!(names, vec!["count_*".to_string(), "avg_salary".to_string()]);
        assert_eq!(clauses.group_by.as_deref(), Some("department"));
    }

    #[test]
    fn test_parse_where_order_by() {
        let clauses =
            parse_sql("SELECT * FROM t WHERE a = 'x' AND b > 2 ORDER BY t.Salary DESC;").unwrap();
        let where_tokens = clauses.where_tokens.unwrap();
        assert_eq!(render(&where_tokens), "a = 'x' AND b > 2");
        assert_eq!(
            clauses.order_by,
            Some(OrderBy {
                column: "salary".into(),
                descending: true,
            })
        );
    }

    #[test]
    fn test_parse_join() {
        let clauses = parse_sql(
            "SELECT e.name, d.name FROM employees e INNER JOIN departments d ON e.department_id = d.id WHERE d.location = 'Building A'",
        )
        .unwrap();
        let join = clauses.join.unwrap();
        assert_eq!(join.right.name, "departments");
        assert_eq!(join.left_qualifier, "e");
        assert_eq!(join.left_column, "department_id");
        assert_eq!(join.right_qualifier, "d");
        assert_eq!(join.right_column, "id");
        assert!(clauses.where_tokens.is_some());
    }

    #[test]
    fn test_missing_from() {
        assert!(matches!(
            parse_sql("SELECT name"),
            Err(SandboxError::MissingClause(ref c)) if c == "FROM"
        ));
        assert!(matches!(
            parse_sql("SELECT name FROM"),
            Err(SandboxError::MissingClause(ref c)) if c == "FROM"
        ));
    }

    #[test]
    fn test_join_errors() {
        assert!(matches!(
            parse_sql("SELECT * FROM a JOIN b WHERE x = 1"),
            Err(SandboxError::MissingClause(ref c)) if c == "ON"
        ));

        let err = parse_sql("SELECT * FROM a JOIN b ON a.id > b.id").unwrap_err();
        assert!(matches!(err, SandboxError::InvalidJoinCondition(_)));
        assert_eq!(
            err.to_string(),
            "Invalid JOIN condition format: a.id > b.id. Use: table1.column = table2.column"
        );

        assert!(matches!(
            parse_sql("SELECT * FROM a LEFT JOIN b ON a.id = b.id"),
            Err(SandboxError::Syntax(_))
        ));
        assert!(matches!(
            parse_sql("SELECT * FROM a JOIN b ON a.id = b.id JOIN c ON b.id = c.id"),
            Err(SandboxError::Syntax(_))
        ));
    }

    #[test]
    fn test_unsupported_clauses() {
        for sql in [
            "SELECT * FROM t LIMIT 5",
            "SELECT d, COUNT(*) FROM t GROUP BY d HAVING COUNT(*) > 1",
            "SELECT DISTINCT d FROM t",
            "SELECT UPPER(name) FROM t",
            "SELECT * FROM t extra tokens",
        ] {
            assert!(
                matches!(parse_sql(sql), Err(SandboxError::Syntax(_))),
                "expected syntax error for {}",
                sql
            );
        }

        let err = parse_sql("SELECT * FROM t LIMIT 5").unwrap_err();
        assert!(err.to_string().starts_with("Syntax error: LIMIT is not supported"));
    }
}
